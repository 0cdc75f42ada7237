use std::collections::BTreeSet;

use crate::models::{Classification, RoleLabel};
use crate::remote::RemoteClassifier;
use crate::skills::extract_skills;
use crate::traits::{RoleClassifier, RoleModel};

/// Reasoning recorded when no heuristic fires.
pub const FALLBACK_REASON: &str = "fallback default";

const BACKEND_FRAMEWORKS: &[&str] = &["Node.js", "Django", "Flask", "Laravel"];
const FRONTEND_FRAMEWORKS: &[&str] = &["React", "Vue"];
const CLOUD_PROVIDERS: &[&str] = &["AWS", "Azure", "GCP"];
const BACKEND_INDICATORS: &[&str] = &["Django", "Flask", "Laravel", "Node.js", "SQL", "NoSQL"];

fn has_any(skills: &BTreeSet<&str>, wanted: &[&str]) -> bool {
    wanted.iter().any(|w| skills.contains(w))
}

/// Classify from an already-extracted skill set.
///
/// Heuristics run in order and each one that fires overwrites the label, so
/// later rules win: ML + Docker + cloud yields DevOps, not Data/ML.
pub fn classify_skills(skills: &BTreeSet<&str>) -> Classification {
    let mut role = RoleLabel::Other;
    let mut reasons: Vec<&str> = Vec::new();

    if skills.contains("Machine Learning") {
        role = RoleLabel::DataMl;
        reasons.push("mentions ML/AI tools or keywords");
    }
    if skills.contains("Docker") && has_any(skills, CLOUD_PROVIDERS) {
        role = RoleLabel::DevOps;
        reasons.push("mentions Docker and cloud provider");
    }
    if has_any(skills, FRONTEND_FRAMEWORKS) {
        role = RoleLabel::Frontend;
        reasons.push("mentions React/Vue");
    }
    if has_any(skills, BACKEND_FRAMEWORKS) && has_any(skills, FRONTEND_FRAMEWORKS) {
        role = RoleLabel::FullStack;
        reasons.push("mentions backend + frontend stack");
    }
    if role == RoleLabel::Other && has_any(skills, BACKEND_INDICATORS) {
        role = RoleLabel::Backend;
        reasons.push("mentions backend frameworks/databases");
    }

    let reasoning = if reasons.is_empty() {
        FALLBACK_REASON.to_string()
    } else {
        reasons.join("; ")
    };

    Classification { role, reasoning }
}

/// Deterministic keyword classifier. Always available.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleClassifier;

impl RuleClassifier {
    pub fn new() -> Self {
        Self
    }

    pub fn classify_text(&self, text: &str) -> Classification {
        classify_skills(&extract_skills(text))
    }
}

impl RoleClassifier for RuleClassifier {
    async fn classify(&self, text: &str) -> Classification {
        self.classify_text(text)
    }
}

/// Classifier chosen once at startup.
///
/// `Remote` is used only when a classification credential is configured.
#[derive(Clone)]
pub enum Classifier<M: RoleModel> {
    Rules(RuleClassifier),
    Remote(RemoteClassifier<M>),
}

impl<M: RoleModel> Classifier<M> {
    /// Remote classification when a model is available, rules otherwise.
    pub fn from_model(model: Option<M>) -> Self {
        match model {
            Some(model) => Classifier::Remote(RemoteClassifier::new(model)),
            None => Classifier::Rules(RuleClassifier::new()),
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Classifier::Remote(_))
    }
}

impl<M: RoleModel> RoleClassifier for Classifier<M> {
    async fn classify(&self, text: &str) -> Classification {
        match self {
            Classifier::Rules(rules) => rules.classify(text).await,
            Classifier::Remote(remote) => remote.classify(text).await,
        }
    }
}
