use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel stored when a source does not report a location.
pub const LOCATION_NOT_AVAILABLE: &str = "N/A";

/// Role category assigned to a posting by a classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RoleLabel {
    Backend,
    Frontend,
    #[serde(rename = "Full-Stack")]
    FullStack,
    #[serde(rename = "Data/ML")]
    DataMl,
    DevOps,
    Other,
}

impl RoleLabel {
    pub const ALL: [RoleLabel; 6] = [
        RoleLabel::Backend,
        RoleLabel::Frontend,
        RoleLabel::FullStack,
        RoleLabel::DataMl,
        RoleLabel::DevOps,
        RoleLabel::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RoleLabel::Backend => "Backend",
            RoleLabel::Frontend => "Frontend",
            RoleLabel::FullStack => "Full-Stack",
            RoleLabel::DataMl => "Data/ML",
            RoleLabel::DevOps => "DevOps",
            RoleLabel::Other => "Other",
        }
    }
}

impl fmt::Display for RoleLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RoleLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        RoleLabel::ALL
            .into_iter()
            .find(|label| label.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown role label: {}", s))
    }
}

/// A posting as mapped by a source adapter, before defaults are filled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingCandidate {
    pub source: String,
    pub source_id: String,
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub remote: Option<bool>,
    pub url: String,
    pub description: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

/// The canonical job posting record, keyed by `(source, source_id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    pub source: String,
    pub source_id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub remote: bool,
    pub url: String,
    pub description: String,
    pub published_at: Option<DateTime<Utc>>,
    pub ingested_at: Option<DateTime<Utc>>,
    pub ai_class: Option<RoleLabel>,
    pub ai_reasoning: Option<String>,
    /// Sorted, unique skill labels.
    pub tags: Vec<String>,
}

impl JobPosting {
    /// Build an unannotated posting from a candidate, filling defaults.
    pub fn from_candidate(candidate: ListingCandidate) -> Self {
        let location = candidate
            .location
            .filter(|l| !l.trim().is_empty())
            .unwrap_or_else(|| LOCATION_NOT_AVAILABLE.to_string());

        Self {
            source: candidate.source,
            source_id: candidate.source_id,
            title: candidate.title,
            company: candidate.company,
            location,
            remote: candidate.remote.unwrap_or(false),
            url: candidate.url,
            description: candidate.description.unwrap_or_default(),
            published_at: candidate.published_at,
            ingested_at: None,
            ai_class: None,
            ai_reasoning: None,
            tags: Vec::new(),
        }
    }

    /// True once both a role and its reasoning are attached.
    pub fn is_annotated(&self) -> bool {
        self.ai_class.is_some() && self.ai_reasoning.as_deref().is_some_and(|r| !r.is_empty())
    }

    /// Text fed to the classifiers and the skill extractor.
    pub fn classification_text(&self) -> String {
        format!("{} {}", self.title, self.description)
    }

    /// Copy the annotation (role, reasoning, tags) from a previously stored record.
    pub fn inherit_annotation(&mut self, previous: &JobPosting) {
        self.ai_class = previous.ai_class;
        self.ai_reasoning = previous.ai_reasoning.clone();
        self.tags = previous.tags.clone();
    }
}

/// Output of a role classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub role: RoleLabel,
    pub reasoning: String,
}

/// Predicates applied by [`JobStore::find`](crate::traits::JobStore::find).
///
/// All set predicates must match; unset ones match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobFilter {
    /// Case-insensitive substring over title, company, or location.
    pub query: Option<String>,
    pub role: Option<RoleLabel>,
    /// Exact skill tag the posting must carry.
    pub skill: Option<String>,
}

impl JobFilter {
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn with_role(mut self, role: RoleLabel) -> Self {
        self.role = Some(role);
        self
    }

    pub fn with_skill(mut self, skill: impl Into<String>) -> Self {
        self.skill = Some(skill.into());
        self
    }

    /// The query, trimmed, or `None` when blank.
    pub fn normalized_query(&self) -> Option<String> {
        self.query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase)
    }

    pub fn matches(&self, posting: &JobPosting) -> bool {
        if let Some(q) = self.normalized_query() {
            let hit = [&posting.title, &posting.company, &posting.location]
                .iter()
                .any(|field| field.to_lowercase().contains(&q));
            if !hit {
                return false;
            }
        }
        if let Some(role) = self.role
            && posting.ai_class != Some(role)
        {
            return false;
        }
        if let Some(skill) = &self.skill
            && !posting.tags.iter().any(|t| t == skill)
        {
            return false;
        }
        true
    }
}

/// One row of the tag distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillCount {
    pub skill: String,
    pub count: u64,
}

/// Summary of one enrichment pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RefreshReport {
    /// Candidates returned by the aggregator.
    pub fetched: usize,
    /// Candidates that went through the classifier this run.
    pub classified: usize,
    /// Candidates whose stored annotation was kept.
    pub reused: usize,
    /// Records written to the store.
    pub upserted: usize,
}
