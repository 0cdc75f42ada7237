//! Test utilities: mock implementations of the core traits.
//!
//! Handwritten mocks for dependency injection in unit tests.
//! All mocks use `Arc<Mutex<_>>` for interior mutability, allowing
//! test assertions on recorded calls.

use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};

use crate::error::AppError;
use crate::models::{JobFilter, JobPosting, ListingCandidate, RoleLabel, SkillCount};
use crate::traits::{JobStore, RoleModel, SourceFetcher};

// ---------------------------------------------------------------------------
// MockSource
// ---------------------------------------------------------------------------

/// Mock listing source returning the same candidates on every call.
#[derive(Clone)]
pub struct MockSource {
    name: &'static str,
    candidates: Arc<Mutex<Vec<ListingCandidate>>>,
    error: Option<String>,
    calls: Arc<Mutex<usize>>,
}

impl MockSource {
    pub fn new(name: &'static str, candidates: Vec<ListingCandidate>) -> Self {
        Self {
            name,
            candidates: Arc::new(Mutex::new(candidates)),
            error: None,
            calls: Arc::new(Mutex::new(0)),
        }
    }

    /// Source whose every fetch fails.
    pub fn failing(name: &'static str, message: &str) -> Self {
        Self {
            name,
            candidates: Arc::new(Mutex::new(Vec::new())),
            error: Some(message.to_string()),
            calls: Arc::new(Mutex::new(0)),
        }
    }

    /// Replace what the upstream returns from now on.
    pub fn set_candidates(&self, candidates: Vec<ListingCandidate>) {
        *self.candidates.lock().unwrap() = candidates;
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

impl SourceFetcher for MockSource {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn fetch(&self, _limit: usize) -> Result<Vec<ListingCandidate>, AppError> {
        *self.calls.lock().unwrap() += 1;
        if let Some(message) = &self.error {
            return Err(AppError::NetworkError(message.clone()));
        }
        Ok(self.candidates.lock().unwrap().clone())
    }
}

// ---------------------------------------------------------------------------
// MockRoleModel
// ---------------------------------------------------------------------------

/// Mock remote model. Each call pops the next queued reply.
///
/// When the queue is empty, calls fail with a network error.
#[derive(Clone)]
pub struct MockRoleModel {
    replies: Arc<Mutex<Vec<Result<String, AppError>>>>,
    calls: Arc<Mutex<usize>>,
}

impl MockRoleModel {
    pub fn with_replies(replies: Vec<Result<String, AppError>>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(replies)),
            calls: Arc::new(Mutex::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

impl RoleModel for MockRoleModel {
    fn provider(&self) -> &str {
        "mock"
    }

    async fn complete(&self, _prompt: &str) -> Result<String, AppError> {
        *self.calls.lock().unwrap() += 1;
        let mut replies = self.replies.lock().unwrap();
        if replies.is_empty() {
            Err(AppError::NetworkError("mock model exhausted".into()))
        } else {
            replies.remove(0)
        }
    }
}

// ---------------------------------------------------------------------------
// FailingStore
// ---------------------------------------------------------------------------

/// Store whose every operation fails, as when the database is unreachable.
#[derive(Clone)]
pub struct FailingStore;

impl JobStore for FailingStore {
    async fn upsert(&self, _postings: &[JobPosting]) -> Result<usize, AppError> {
        Err(AppError::DatabaseError("connection refused".into()))
    }

    async fn find(&self, _filter: &JobFilter) -> Result<Vec<JobPosting>, AppError> {
        Err(AppError::DatabaseError("connection refused".into()))
    }

    async fn find_one(
        &self,
        _source: &str,
        _source_id: &str,
    ) -> Result<Option<JobPosting>, AppError> {
        Err(AppError::DatabaseError("connection refused".into()))
    }

    async fn skill_distribution(&self) -> Result<Vec<SkillCount>, AppError> {
        Err(AppError::DatabaseError("connection refused".into()))
    }

    async fn roles(&self) -> Result<Vec<RoleLabel>, AppError> {
        Err(AppError::DatabaseError("connection refused".into()))
    }
}

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

/// Create a dummy candidate for the given natural key.
pub fn make_candidate(source: &str, source_id: &str) -> ListingCandidate {
    ListingCandidate {
        source: source.to_string(),
        source_id: source_id.to_string(),
        title: "Senior Django Engineer".to_string(),
        company: "Acme Corp".to_string(),
        location: Some("Berlin".to_string()),
        remote: Some(true),
        url: format!("https://jobs.example.com/{source}/{source_id}"),
        description: Some("Build APIs with Django, Postgres and React.".to_string()),
        published_at: Some(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()),
    }
}

/// Create an unannotated posting for the given natural key.
pub fn make_posting(source: &str, source_id: &str) -> JobPosting {
    JobPosting::from_candidate(make_candidate(source, source_id))
}
