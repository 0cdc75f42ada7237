pub mod cleaner;
pub mod http;
pub mod llm;
pub mod sources;

pub use cleaner::DescriptionCleaner;
pub use http::JsonClient;
pub use llm::OpenAiRoleModel;
pub use sources::{ArbeitnowSource, ListingSource, RemoteOkSource, default_sources};
