//! Public job-board adapters.
//!
//! Each adapter maps one board's JSON payload into [`ListingCandidate`]s.
//! Mapping is kept in pure functions over `serde_json::Value` so it can be
//! exercised against recorded payloads.

mod arbeitnow;
mod remoteok;

pub use arbeitnow::{ARBEITNOW_URL, ArbeitnowSource};
pub use remoteok::{REMOTEOK_URL, RemoteOkSource};

use jobscout_core::error::AppError;
use jobscout_core::models::ListingCandidate;
use jobscout_core::traits::SourceFetcher;
use serde_json::Value;
use url::Url;

use crate::cleaner::DescriptionCleaner;
use crate::http::JsonClient;

/// Every built-in source behind one concrete type, so an aggregator can
/// hold them in a single `Vec`.
#[derive(Clone)]
pub enum ListingSource {
    Arbeitnow(ArbeitnowSource),
    RemoteOk(RemoteOkSource),
}

impl SourceFetcher for ListingSource {
    fn name(&self) -> &'static str {
        match self {
            Self::Arbeitnow(s) => s.name(),
            Self::RemoteOk(s) => s.name(),
        }
    }

    async fn fetch(&self, limit: usize) -> Result<Vec<ListingCandidate>, AppError> {
        match self {
            Self::Arbeitnow(s) => s.fetch(limit).await,
            Self::RemoteOk(s) => s.fetch(limit).await,
        }
    }
}

/// The built-in sources, in aggregation order.
pub fn default_sources(client: &JsonClient, cleaner: &DescriptionCleaner) -> Vec<ListingSource> {
    vec![
        ListingSource::Arbeitnow(ArbeitnowSource::new(client.clone(), cleaner.clone())),
        ListingSource::RemoteOk(RemoteOkSource::new(client.clone(), cleaner.clone())),
    ]
}

pub(crate) fn validate_url(raw: &str) -> Result<String, AppError> {
    Url::parse(raw)
        .map(|u| u.to_string())
        .map_err(|e| AppError::ConfigError(format!("Invalid source URL '{raw}': {e}")))
}

/// Identifier text from a string or numeric JSON value. Blank strings count as absent.
pub(crate) fn value_as_id(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// First non-blank string among `candidates`.
pub(crate) fn first_text<'a>(candidates: impl IntoIterator<Item = Option<&'a str>>) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// JSON value that is neither missing, null, nor an empty string.
pub(crate) fn present(value: Option<&Value>) -> Option<&Value> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(v) => Some(v),
    }
}
