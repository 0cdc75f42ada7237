use jobscout_core::error::AppError;
use jobscout_core::memory::InMemoryStore;
use jobscout_core::models::{JobFilter, JobPosting, RoleLabel, SkillCount};
use jobscout_core::traits::JobStore;

use crate::config::DatabaseConfig;
use crate::database::Database;
use crate::repository::JobRepository;

/// The store backend chosen at startup.
#[derive(Clone)]
pub enum Store {
    Postgres(JobRepository),
    Memory(InMemoryStore),
}

impl Store {
    /// PostgreSQL when configured (migrations applied), otherwise a fresh
    /// in-memory store.
    pub async fn connect(config: Option<&DatabaseConfig>) -> Result<Self, AppError> {
        match config {
            Some(config) => {
                let db = Database::connect(config).await?;
                db.migrate().await?;
                tracing::info!(max_connections = config.max_connections, "Using PostgreSQL store");
                Ok(Self::Postgres(db.job_repo()))
            }
            None => {
                tracing::info!("DATABASE_URL not set, using in-memory store");
                Ok(Self::Memory(InMemoryStore::new()))
            }
        }
    }

    pub fn backend(&self) -> &'static str {
        match self {
            Self::Postgres(_) => "postgres",
            Self::Memory(_) => "memory",
        }
    }

    pub async fn health_check(&self) -> Result<(), AppError> {
        match self {
            Self::Postgres(repo) => repo.health_check().await,
            Self::Memory(_) => Ok(()),
        }
    }
}

impl JobStore for Store {
    async fn upsert(&self, postings: &[JobPosting]) -> Result<usize, AppError> {
        match self {
            Self::Postgres(s) => s.upsert(postings).await,
            Self::Memory(s) => s.upsert(postings).await,
        }
    }

    async fn find(&self, filter: &JobFilter) -> Result<Vec<JobPosting>, AppError> {
        match self {
            Self::Postgres(s) => s.find(filter).await,
            Self::Memory(s) => s.find(filter).await,
        }
    }

    async fn find_one(&self, source: &str, source_id: &str) -> Result<Option<JobPosting>, AppError> {
        match self {
            Self::Postgres(s) => s.find_one(source, source_id).await,
            Self::Memory(s) => s.find_one(source, source_id).await,
        }
    }

    async fn skill_distribution(&self) -> Result<Vec<SkillCount>, AppError> {
        match self {
            Self::Postgres(s) => s.skill_distribution().await,
            Self::Memory(s) => s.skill_distribution().await,
        }
    }

    async fn roles(&self) -> Result<Vec<RoleLabel>, AppError> {
        match self {
            Self::Postgres(s) => s.roles().await,
            Self::Memory(s) => s.roles().await,
        }
    }
}
