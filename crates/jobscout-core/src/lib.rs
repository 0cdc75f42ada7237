pub mod aggregator;
pub mod classifier;
pub mod error;
pub mod memory;
pub mod models;
pub mod pipeline;
pub mod remote;
pub mod skills;
pub mod traits;
pub mod util;

#[cfg(test)]
pub(crate) mod testutil;

pub use aggregator::Aggregator;
pub use classifier::{Classifier, RuleClassifier};
pub use error::AppError;
pub use memory::InMemoryStore;
pub use models::{
    Classification, JobFilter, JobPosting, ListingCandidate, RefreshReport, RoleLabel, SkillCount,
};
pub use pipeline::EnrichmentPipeline;
pub use remote::{RemoteClassifier, RetryPolicy};
pub use skills::{extract_skills, extract_tags};
pub use traits::{JobStore, RoleClassifier, RoleModel, SourceFetcher};
