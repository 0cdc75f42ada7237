use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::AppError;
use crate::models::{JobFilter, JobPosting, RoleLabel, SkillCount};
use crate::traits::JobStore;

type NaturalKey = (String, String);

/// Process-local store with the same semantics as the PostgreSQL repository.
///
/// Clones share the same underlying map. Writers take an exclusive lock, so
/// concurrent upserts to one key resolve last-writer-wins.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    postings: Arc<RwLock<BTreeMap<NaturalKey, JobPosting>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.postings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Newest `published_at` first, undated last, then natural key ascending.
pub fn compare_for_listing(a: &JobPosting, b: &JobPosting) -> Ordering {
    match (a.published_at, b.published_at) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.source.cmp(&b.source))
    .then_with(|| a.source_id.cmp(&b.source_id))
}

/// Count tags and order by count descending, then skill ascending.
pub fn tally_skills<'a>(postings: impl IntoIterator<Item = &'a JobPosting>) -> Vec<SkillCount> {
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for posting in postings {
        for tag in &posting.tags {
            *counts.entry(tag.as_str()).or_default() += 1;
        }
    }

    let mut distribution: Vec<SkillCount> = counts
        .into_iter()
        .map(|(skill, count)| SkillCount {
            skill: skill.to_string(),
            count,
        })
        .collect();
    distribution.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.skill.cmp(&b.skill)));
    distribution
}

impl JobStore for InMemoryStore {
    async fn upsert(&self, postings: &[JobPosting]) -> Result<usize, AppError> {
        let mut map = self
            .postings
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        for posting in postings {
            map.insert(
                (posting.source.clone(), posting.source_id.clone()),
                posting.clone(),
            );
        }
        Ok(postings.len())
    }

    async fn find(&self, filter: &JobFilter) -> Result<Vec<JobPosting>, AppError> {
        let map = self.postings.read().unwrap_or_else(PoisonError::into_inner);
        let mut found: Vec<JobPosting> = map.values().filter(|p| filter.matches(p)).cloned().collect();
        found.sort_by(compare_for_listing);
        Ok(found)
    }

    async fn find_one(&self, source: &str, source_id: &str) -> Result<Option<JobPosting>, AppError> {
        let map = self.postings.read().unwrap_or_else(PoisonError::into_inner);
        Ok(map
            .get(&(source.to_string(), source_id.to_string()))
            .cloned())
    }

    async fn skill_distribution(&self) -> Result<Vec<SkillCount>, AppError> {
        let map = self.postings.read().unwrap_or_else(PoisonError::into_inner);
        Ok(tally_skills(map.values()))
    }

    async fn roles(&self) -> Result<Vec<RoleLabel>, AppError> {
        let map = self.postings.read().unwrap_or_else(PoisonError::into_inner);
        let mut roles: Vec<RoleLabel> = map.values().filter_map(|p| p.ai_class).collect();
        roles.sort_by_key(|r| r.as_str());
        roles.dedup();
        Ok(roles)
    }
}
