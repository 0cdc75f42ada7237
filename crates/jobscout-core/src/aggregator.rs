use futures::future::join_all;

use crate::models::{JobPosting, ListingCandidate};
use crate::traits::SourceFetcher;

/// Fans out over every registered source and normalizes the results.
///
/// Sources are fetched concurrently. A source that errors contributes
/// nothing for this cycle; the others are unaffected.
#[derive(Clone)]
pub struct Aggregator<F: SourceFetcher> {
    sources: Vec<F>,
}

impl<F: SourceFetcher> Aggregator<F> {
    pub fn new(sources: Vec<F>) -> Self {
        Self { sources }
    }

    /// Fetch up to `limit_per_source` postings from each source.
    ///
    /// Results keep source registration order. No cross-source dedup:
    /// the natural key includes the source.
    pub async fn fetch_all(&self, limit_per_source: usize) -> Vec<JobPosting> {
        let batches = join_all(
            self.sources
                .iter()
                .map(|source| fetch_isolated(source, limit_per_source)),
        )
        .await;

        batches
            .into_iter()
            .flatten()
            .map(JobPosting::from_candidate)
            .collect()
    }
}

async fn fetch_isolated<F: SourceFetcher>(
    source: &F,
    limit: usize,
) -> Vec<ListingCandidate> {
    match source.fetch(limit).await {
        Ok(mut candidates) => {
            candidates.truncate(limit);
            tracing::info!(source = source.name(), count = candidates.len(), "Fetched listings");
            candidates
        }
        Err(e) => {
            tracing::warn!(source = source.name(), error = %e, "Source fetch failed, skipping this cycle");
            Vec::new()
        }
    }
}
