use chrono::Utc;

use crate::aggregator::Aggregator;
use crate::error::AppError;
use crate::models::{JobPosting, RefreshReport};
use crate::skills::extract_tags;
use crate::traits::{JobStore, RoleClassifier, SourceFetcher};

/// Orchestrates one refresh: aggregate, annotate, upsert.
pub struct EnrichmentPipeline<F, C, S>
where
    F: SourceFetcher,
    C: RoleClassifier,
    S: JobStore,
{
    aggregator: Aggregator<F>,
    classifier: C,
    store: S,
}

impl<F, C, S> EnrichmentPipeline<F, C, S>
where
    F: SourceFetcher,
    C: RoleClassifier,
    S: JobStore,
{
    pub fn new(aggregator: Aggregator<F>, classifier: C, store: S) -> Self {
        Self {
            aggregator,
            classifier,
            store,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run the pipeline and return the number of postings upserted.
    pub async fn run(&self, limit_per_source: usize) -> Result<usize, AppError> {
        Ok(self.refresh(limit_per_source).await?.upserted)
    }

    /// Run the pipeline and report what happened.
    ///
    /// 1. Fetch and normalize candidates from every source
    /// 2. Stamp `ingested_at`
    /// 3. Carry over any annotation already stored for the same key
    /// 4. Classify and tag candidates that are still unannotated
    /// 5. Upsert everything
    ///
    /// Only store errors propagate.
    pub async fn refresh(&self, limit_per_source: usize) -> Result<RefreshReport, AppError> {
        let mut candidates = self.aggregator.fetch_all(limit_per_source).await;
        let mut report = RefreshReport {
            fetched: candidates.len(),
            ..RefreshReport::default()
        };
        tracing::info!(count = report.fetched, "Aggregated candidates");

        let now = Utc::now();
        for posting in candidates.iter_mut() {
            posting.ingested_at = Some(now);

            if let Some(previous) = self
                .store
                .find_one(&posting.source, &posting.source_id)
                .await?
                && previous.is_annotated()
            {
                posting.inherit_annotation(&previous);
            }

            if posting.is_annotated() {
                report.reused += 1;
                tracing::debug!(
                    source = %posting.source,
                    source_id = %posting.source_id,
                    "Already classified, skipping"
                );
                continue;
            }

            self.annotate(posting).await;
            report.classified += 1;
        }

        report.upserted = self.store.upsert(&candidates).await?;
        tracing::info!(
            fetched = report.fetched,
            classified = report.classified,
            reused = report.reused,
            upserted = report.upserted,
            "Refresh complete"
        );
        Ok(report)
    }

    /// Attach role, reasoning, and tags. Tags are always recomputed with the role.
    async fn annotate(&self, posting: &mut JobPosting) {
        let text = posting.classification_text();
        let classification = self.classifier.classify(&text).await;
        let tags = extract_tags(&text);

        tracing::info!(
            title = %posting.title,
            role = %classification.role,
            skills = ?tags.iter().take(5).collect::<Vec<_>>(),
            "Annotated posting"
        );

        posting.ai_class = Some(classification.role);
        posting.ai_reasoning = Some(classification.reasoning);
        posting.tags = tags;
    }
}
