use chrono::{DateTime, Utc};
use jobscout_core::error::AppError;
use jobscout_core::models::{JobFilter, JobPosting, RoleLabel, SkillCount};
use jobscout_core::traits::JobStore;
use sqlx::{PgPool, Pool, Postgres};

const SELECT_COLUMNS: &str = "source, source_id, title, company, location, remote, url, description, \
     published_at, ingested_at, ai_class, ai_reasoning, tags";

// Tie-breaks use byte order so results line up with the in-memory store.
const LISTING_ORDER: &str =
    r#"ORDER BY published_at DESC NULLS LAST, source COLLATE "C", source_id COLLATE "C""#;

/// Job posting persistence in PostgreSQL.
#[derive(Clone)]
pub struct JobRepository {
    pool: Pool<Postgres>,
}

impl JobRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Check database connectivity.
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;
        Ok(())
    }
}

// -- Internal row type for sqlx deserialization --

#[derive(sqlx::FromRow)]
struct JobRow {
    source: String,
    source_id: String,
    title: String,
    company: String,
    location: String,
    remote: bool,
    url: String,
    description: String,
    published_at: Option<DateTime<Utc>>,
    ingested_at: Option<DateTime<Utc>>,
    ai_class: Option<String>,
    ai_reasoning: Option<String>,
    tags: Vec<String>,
}

impl TryFrom<JobRow> for JobPosting {
    type Error = AppError;

    fn try_from(row: JobRow) -> Result<Self, Self::Error> {
        let ai_class = row
            .ai_class
            .as_deref()
            .map(str::parse::<RoleLabel>)
            .transpose()
            .map_err(AppError::DatabaseError)?;

        Ok(JobPosting {
            source: row.source,
            source_id: row.source_id,
            title: row.title,
            company: row.company,
            location: row.location,
            remote: row.remote,
            url: row.url,
            description: row.description,
            published_at: row.published_at,
            ingested_at: row.ingested_at,
            ai_class,
            ai_reasoning: row.ai_reasoning,
            tags: row.tags,
        })
    }
}

fn into_postings(rows: Vec<JobRow>) -> Result<Vec<JobPosting>, AppError> {
    rows.into_iter().map(JobPosting::try_from).collect()
}

// -- Trait implementation --

impl JobStore for JobRepository {
    async fn upsert(&self, postings: &[JobPosting]) -> Result<usize, AppError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        for posting in postings {
            sqlx::query(
                r#"
                INSERT INTO job_postings (
                    source, source_id, title, company, location, remote, url, description,
                    published_at, ingested_at, ai_class, ai_reasoning, tags
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
                ON CONFLICT (source, source_id) DO UPDATE SET
                    title = EXCLUDED.title,
                    company = EXCLUDED.company,
                    location = EXCLUDED.location,
                    remote = EXCLUDED.remote,
                    url = EXCLUDED.url,
                    description = EXCLUDED.description,
                    published_at = EXCLUDED.published_at,
                    ingested_at = EXCLUDED.ingested_at,
                    ai_class = EXCLUDED.ai_class,
                    ai_reasoning = EXCLUDED.ai_reasoning,
                    tags = EXCLUDED.tags
                "#,
            )
            .bind(&posting.source)
            .bind(&posting.source_id)
            .bind(&posting.title)
            .bind(&posting.company)
            .bind(&posting.location)
            .bind(posting.remote)
            .bind(&posting.url)
            .bind(&posting.description)
            .bind(posting.published_at)
            .bind(posting.ingested_at)
            .bind(posting.ai_class.map(|role| role.as_str()))
            .bind(posting.ai_reasoning.as_deref())
            .bind(&posting.tags)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        tracing::debug!(count = postings.len(), "Upserted job postings");
        Ok(postings.len())
    }

    async fn find(&self, filter: &JobFilter) -> Result<Vec<JobPosting>, AppError> {
        let sql = format!(
            r#"
            SELECT {SELECT_COLUMNS}
            FROM job_postings
            WHERE ($1::text IS NULL
                   OR strpos(lower(title), $1) > 0
                   OR strpos(lower(company), $1) > 0
                   OR strpos(lower(location), $1) > 0)
              AND ($2::text IS NULL OR ai_class = $2)
              AND ($3::text IS NULL OR $3 = ANY(tags))
            {LISTING_ORDER}
            "#
        );

        let rows = sqlx::query_as::<_, JobRow>(&sql)
            .bind(filter.normalized_query())
            .bind(filter.role.map(|role| role.as_str()))
            .bind(filter.skill.as_deref())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        into_postings(rows)
    }

    async fn find_one(&self, source: &str, source_id: &str) -> Result<Option<JobPosting>, AppError> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM job_postings WHERE source = $1 AND source_id = $2"
        );

        let row = sqlx::query_as::<_, JobRow>(&sql)
            .bind(source)
            .bind(source_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        row.map(JobPosting::try_from).transpose()
    }

    async fn skill_distribution(&self) -> Result<Vec<SkillCount>, AppError> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT tag, COUNT(*) AS postings
            FROM job_postings CROSS JOIN LATERAL unnest(tags) AS tag
            GROUP BY tag
            ORDER BY postings DESC, tag COLLATE "C"
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|(skill, count)| SkillCount {
                skill,
                count: count.max(0) as u64,
            })
            .collect())
    }

    async fn roles(&self) -> Result<Vec<RoleLabel>, AppError> {
        let labels: Vec<String> = sqlx::query_scalar(
            "SELECT DISTINCT ai_class FROM job_postings WHERE ai_class IS NOT NULL",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        let mut roles = labels
            .iter()
            .map(|label| label.parse::<RoleLabel>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(AppError::DatabaseError)?;
        roles.sort_by_key(|role| role.as_str());
        Ok(roles)
    }
}
