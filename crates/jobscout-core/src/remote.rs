//! Remote role classification with bounded retry and rule-based fallback.
//!
//! Each call walks a small state machine:
//!
//! ```text
//! Attempting --ok--------------------------------> Succeeded
//!     |  \--malformed reply-----------------------> FallenBack
//!     |
//!     +--transport error, attempts left--> RetryPending --delay--> Attempting
//!     +--transport error, none left---------------> FallenBack
//! ```
//!
//! `FallenBack` always resolves through [`RuleClassifier`], so classification
//! never fails.

use std::time::Duration;

use serde::Deserialize;

use crate::classifier::RuleClassifier;
use crate::error::AppError;
use crate::models::{Classification, RoleLabel};
use crate::traits::{RoleClassifier, RoleModel};
use crate::util::truncate_chars;

/// Maximum characters of posting text sent to the model.
pub const PROMPT_CHAR_BUDGET: usize = 6000;

/// Skills quoted back in the reasoning string.
pub const MAX_REPORTED_SKILLS: usize = 5;

/// Bounded retry for transient classification failures.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }
}

/// Why the remote path gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackCause {
    RetriesExhausted,
    MalformedResponse,
}

#[derive(Debug)]
enum AttemptState {
    Attempting { attempt: u32 },
    RetryPending { attempt: u32 },
    FallenBack { cause: FallbackCause, attempts: u32 },
    Succeeded { classification: Classification, attempts: u32 },
}

/// Result of one remote classification, including how it was reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteOutcome {
    pub classification: Classification,
    /// Model calls made.
    pub attempts: u32,
    /// `Some` when the rule-based classifier produced the result.
    pub fallback: Option<FallbackCause>,
}

#[derive(Deserialize)]
struct RemoteVerdict {
    role: String,
    #[serde(default)]
    skills: Vec<String>,
}

/// Build the instruction sent to the model for one posting.
pub fn build_prompt(text: &str) -> String {
    let labels: Vec<&str> = RoleLabel::ALL.iter().map(RoleLabel::as_str).collect();
    format!(
        "You are a job classification assistant.\n\
         Classify the following job description into one of: {}. \
         Then list 5 key skills in JSON format like:\n\
         {{\"role\": \"Data/ML\", \"skills\": [\"Python\", \"Pandas\", \"SQL\", \"ML\", \"TensorFlow\"]}}\n\
         Respond with the JSON object only.\n\n\
         Job Description:\n{}",
        labels.join(", "),
        truncate_chars(text, PROMPT_CHAR_BUDGET)
    )
}

/// Parse a model reply into a classification.
///
/// Anything other than `{"role": <known label>, "skills": [...]}` is a
/// [`AppError::MalformedResponse`].
pub fn parse_reply(reply: &str, provider: &str) -> Result<Classification, AppError> {
    let body = strip_code_fence(reply.trim());
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| AppError::MalformedResponse(format!("{e}. Raw: {reply}")))?;
    if !value.is_object() {
        return Err(AppError::MalformedResponse(format!(
            "expected a JSON object. Raw: {reply}"
        )));
    }
    let verdict = RemoteVerdict::deserialize(value)
        .map_err(|e| AppError::MalformedResponse(format!("{e}. Raw: {reply}")))?;

    let role: RoleLabel = verdict
        .role
        .parse()
        .map_err(AppError::MalformedResponse)?;

    let skills: Vec<&str> = verdict
        .skills
        .iter()
        .map(String::as_str)
        .take(MAX_REPORTED_SKILLS)
        .collect();

    Ok(Classification {
        role,
        reasoning: format!("AI-classified with {}: {}", provider, skills.join(", ")),
    })
}

/// Models often wrap JSON in a Markdown fence despite instructions.
fn strip_code_fence(s: &str) -> &str {
    let Some(inner) = s.strip_prefix("```") else {
        return s;
    };
    let inner = match inner.get(..4) {
        Some(tag) if tag.eq_ignore_ascii_case("json") => &inner[4..],
        _ => inner,
    };
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

/// Classifier that asks a remote model first and falls back to rules.
#[derive(Clone)]
pub struct RemoteClassifier<M: RoleModel> {
    model: M,
    rules: RuleClassifier,
    policy: RetryPolicy,
}

impl<M: RoleModel> RemoteClassifier<M> {
    pub fn new(model: M) -> Self {
        Self {
            model,
            rules: RuleClassifier::new(),
            policy: RetryPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Classify and report attempts and fallback cause.
    pub async fn classify_detailed(&self, text: &str) -> RemoteOutcome {
        let prompt = build_prompt(text);
        let mut state = AttemptState::Attempting { attempt: 1 };

        loop {
            state = match state {
                AttemptState::Attempting { attempt } => {
                    let reply = self.model.complete(&prompt).await;
                    match reply.and_then(|r| parse_reply(&r, self.model.provider())) {
                        Ok(classification) => AttemptState::Succeeded {
                            classification,
                            attempts: attempt,
                        },
                        Err(e) if e.is_malformed_response() => {
                            tracing::warn!(attempt, error = %e, "Unparseable classification reply, using rules");
                            AttemptState::FallenBack {
                                cause: FallbackCause::MalformedResponse,
                                attempts: attempt,
                            }
                        }
                        Err(e) => {
                            tracing::warn!(
                                attempt,
                                retryable = e.is_retryable(),
                                error = %e,
                                "Classification request failed"
                            );
                            if attempt >= self.policy.max_attempts {
                                AttemptState::FallenBack {
                                    cause: FallbackCause::RetriesExhausted,
                                    attempts: attempt,
                                }
                            } else {
                                AttemptState::RetryPending { attempt }
                            }
                        }
                    }
                }
                AttemptState::RetryPending { attempt } => {
                    tokio::time::sleep(self.policy.delay).await;
                    AttemptState::Attempting {
                        attempt: attempt + 1,
                    }
                }
                AttemptState::FallenBack { cause, attempts } => {
                    tracing::debug!(?cause, attempts, "Falling back to rule-based classification");
                    return RemoteOutcome {
                        classification: self.rules.classify_text(text),
                        attempts,
                        fallback: Some(cause),
                    };
                }
                AttemptState::Succeeded {
                    classification,
                    attempts,
                } => {
                    return RemoteOutcome {
                        classification,
                        attempts,
                        fallback: None,
                    };
                }
            };
        }
    }
}

impl<M: RoleModel> RoleClassifier for RemoteClassifier<M> {
    async fn classify(&self, text: &str) -> Classification {
        self.classify_detailed(text).await.classification
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::MockRoleModel;

    const TEXT: &str = "Machine learning engineer. Docker, AWS, PyTorch.";

    fn fast_policy() -> RetryPolicy {
        RetryPolicy::new(3, Duration::from_millis(1))
    }

    fn network_error() -> AppError {
        AppError::NetworkError("connection reset".into())
    }

    #[tokio::test]
    async fn success_uses_reply_role_and_skills() {
        let model = MockRoleModel::with_replies(vec![Ok(
            r#"{"role": "Data/ML", "skills": ["Python", "PyTorch", "SQL", "ML", "Spark", "Airflow"]}"#
                .to_string(),
        )]);
        let classifier = RemoteClassifier::new(model.clone()).with_policy(fast_policy());

        let outcome = classifier.classify_detailed(TEXT).await;

        assert_eq!(outcome.classification.role, RoleLabel::DataMl);
        assert_eq!(
            outcome.classification.reasoning,
            "AI-classified with mock: Python, PyTorch, SQL, ML, Spark"
        );
        assert_eq!(outcome.attempts, 1);
        assert_eq!(outcome.fallback, None);
        assert_eq!(model.calls(), 1);
    }

    #[tokio::test]
    async fn exhausted_retries_match_rule_based() {
        let model = MockRoleModel::with_replies(vec![
            Err(network_error()),
            Err(AppError::Timeout(30)),
            Err(AppError::HttpError("Failed to parse LLM response".into())),
        ]);
        let classifier = RemoteClassifier::new(model.clone()).with_policy(fast_policy());

        let outcome = classifier.classify_detailed(TEXT).await;

        assert_eq!(outcome.fallback, Some(FallbackCause::RetriesExhausted));
        assert_eq!(outcome.attempts, 3);
        assert_eq!(model.calls(), 3);
        assert_eq!(outcome.classification, RuleClassifier::new().classify_text(TEXT));
    }

    #[tokio::test]
    async fn malformed_reply_falls_back_without_retry() {
        let model = MockRoleModel::with_replies(vec![
            Ok("Sure! This looks like a DevOps role.".to_string()),
            Ok(r#"{"role": "Backend", "skills": []}"#.to_string()),
        ]);
        let classifier = RemoteClassifier::new(model.clone()).with_policy(fast_policy());

        let outcome = classifier.classify_detailed(TEXT).await;

        assert_eq!(outcome.fallback, Some(FallbackCause::MalformedResponse));
        assert_eq!(outcome.attempts, 1);
        assert_eq!(model.calls(), 1);
        assert_eq!(outcome.classification, RuleClassifier::new().classify_text(TEXT));
    }

    #[tokio::test]
    async fn empty_completion_is_permanent() {
        let model = MockRoleModel::with_replies(vec![Err(AppError::MalformedResponse(
            "Empty response from LLM".into(),
        ))]);
        let classifier = RemoteClassifier::new(model.clone()).with_policy(fast_policy());

        let outcome = classifier.classify_detailed(TEXT).await;

        assert_eq!(outcome.fallback, Some(FallbackCause::MalformedResponse));
        assert_eq!(model.calls(), 1);
    }

    #[tokio::test]
    async fn transient_then_success() {
        let model = MockRoleModel::with_replies(vec![
            Err(network_error()),
            Ok(r#"{"role": "Backend", "skills": ["Go"]}"#.to_string()),
        ]);
        let classifier = RemoteClassifier::new(model.clone()).with_policy(fast_policy());

        let outcome = classifier.classify_detailed(TEXT).await;

        assert_eq!(outcome.classification.role, RoleLabel::Backend);
        assert_eq!(outcome.attempts, 2);
        assert_eq!(outcome.fallback, None);
    }

    #[test]
    fn parse_reply_accepts_fenced_json() {
        let reply = "```json\n{\"role\": \"frontend\", \"skills\": [\"React\"]}\n```";
        let c = parse_reply(reply, "OpenAI").unwrap();
        assert_eq!(c.role, RoleLabel::Frontend);
        assert_eq!(c.reasoning, "AI-classified with OpenAI: React");
    }

    #[test]
    fn parse_reply_fence_tag_is_case_insensitive() {
        let reply = "```JSON\n{\"role\": \"DevOps\", \"skills\": [\"Docker\"]}\n```";
        let c = parse_reply(reply, "OpenAI").unwrap();
        assert_eq!(c.role, RoleLabel::DevOps);
        assert_eq!(c.reasoning, "AI-classified with OpenAI: Docker");
    }

    #[tokio::test]
    async fn array_reply_falls_back_to_rules() {
        let text = "Backend engineer: Django and Postgres.";
        let model = MockRoleModel::with_replies(vec![Ok(r#"["Frontend", ["React"]]"#.to_string())]);
        let classifier = RemoteClassifier::new(model.clone()).with_policy(fast_policy());

        let outcome = classifier.classify_detailed(text).await;

        assert_eq!(outcome.fallback, Some(FallbackCause::MalformedResponse));
        assert_eq!(model.calls(), 1);
        assert_eq!(outcome.classification, RuleClassifier::new().classify_text(text));
        assert_eq!(outcome.classification.role, RoleLabel::Backend);
    }

    #[tokio::test(start_paused = true)]
    async fn default_policy_makes_three_attempts_two_seconds_apart() {
        let model = MockRoleModel::with_replies(vec![
            Err(network_error()),
            Err(network_error()),
            Err(network_error()),
        ]);
        let classifier = RemoteClassifier::new(model.clone());
        let started = tokio::time::Instant::now();

        let outcome = classifier.classify_detailed(TEXT).await;

        assert_eq!(started.elapsed(), Duration::from_secs(4));
        assert_eq!(outcome.attempts, 3);
        assert_eq!(model.calls(), 3);
        assert_eq!(outcome.fallback, Some(FallbackCause::RetriesExhausted));
    }

    #[test]
    fn default_retry_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.delay, Duration::from_secs(2));
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts, 1);
    }

    #[test]
    fn parse_reply_missing_skills_defaults_empty() {
        let c = parse_reply(r#"{"role": "Other"}"#, "OpenAI").unwrap();
        assert_eq!(c.role, RoleLabel::Other);
        assert_eq!(c.reasoning, "AI-classified with OpenAI: ");
    }

    #[test]
    fn parse_reply_rejects_unknown_role_and_shapes() {
        for reply in [
            r#"{"role": "Designer", "skills": []}"#,
            r#"{"skills": ["Rust"]}"#,
            r#"["Backend"]"#,
            r#"["Frontend", ["React"]]"#,
            r#""Backend""#,
            "not json at all",
        ] {
            let err = parse_reply(reply, "OpenAI").unwrap_err();
            assert!(err.is_malformed_response(), "{reply} gave {err}");
        }
    }

    #[test]
    fn prompt_lists_labels_and_truncates_text() {
        let long = "x".repeat(PROMPT_CHAR_BUDGET + 500);
        let prompt = build_prompt(&long);
        assert!(prompt.contains("Backend, Frontend, Full-Stack, Data/ML, DevOps, Other"));
        assert!(prompt.contains(&"x".repeat(PROMPT_CHAR_BUDGET)));
        assert!(!prompt.contains(&"x".repeat(PROMPT_CHAR_BUDGET + 1)));
    }
}
