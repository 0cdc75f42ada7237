use std::future::Future;

use crate::error::AppError;
use crate::models::{Classification, JobFilter, JobPosting, ListingCandidate, RoleLabel, SkillCount};

/// Fetches postings from one external listing source.
pub trait SourceFetcher: Send + Sync + Clone {
    /// Stable source identifier stored on every posting (e.g. `"remoteok"`).
    fn name(&self) -> &'static str;

    /// Fetch at most `limit` candidates.
    ///
    /// Individual items that cannot be mapped are skipped; an `Err` means the
    /// whole source was unavailable for this cycle.
    fn fetch(
        &self,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<ListingCandidate>, AppError>> + Send;
}

/// Sends a prompt to a remote text model and returns its raw reply.
pub trait RoleModel: Send + Sync + Clone {
    /// Provider name used in classification reasoning (e.g. `"OpenAI"`).
    fn provider(&self) -> &str;

    /// Returns the model's reply text.
    ///
    /// An empty or missing completion is reported as
    /// [`AppError::MalformedResponse`]; every other error is a transport failure.
    fn complete(&self, prompt: &str) -> impl Future<Output = Result<String, AppError>> + Send;
}

/// Assigns a role label to posting text. Never fails.
pub trait RoleClassifier: Send + Sync + Clone {
    fn classify(&self, text: &str) -> impl Future<Output = Classification> + Send;
}

/// Persists postings keyed by `(source, source_id)`.
pub trait JobStore: Send + Sync + Clone {
    /// Insert or fully replace each posting by natural key. Returns the count processed.
    fn upsert(&self, postings: &[JobPosting])
    -> impl Future<Output = Result<usize, AppError>> + Send;

    /// All postings matching `filter`, newest `published_at` first.
    fn find(
        &self,
        filter: &JobFilter,
    ) -> impl Future<Output = Result<Vec<JobPosting>, AppError>> + Send;

    /// Point lookup by natural key.
    fn find_one(
        &self,
        source: &str,
        source_id: &str,
    ) -> impl Future<Output = Result<Option<JobPosting>, AppError>> + Send;

    /// Tag to posting count across all postings, most frequent first.
    fn skill_distribution(&self) -> impl Future<Output = Result<Vec<SkillCount>, AppError>> + Send;

    /// Distinct role labels present in the store, sorted.
    fn roles(&self) -> impl Future<Output = Result<Vec<RoleLabel>, AppError>> + Send;
}
