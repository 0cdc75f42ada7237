use std::time::Duration;

use jobscout_core::error::AppError;
use jobscout_core::traits::RoleModel;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_CLASSIFY_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_PROVIDER: &str = "OpenAI";
const SYSTEM_PROMPT: &str = "You classify software job postings. Respond ONLY with a JSON object. Do not include explanations.";

/// OpenAI-compatible chat model used for role classification.
///
/// Any endpoint speaking the `/chat/completions` protocol works; point
/// `base_url` at it and optionally rename the provider for reasoning text.
#[derive(Clone)]
pub struct OpenAiRoleModel {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    provider: String,
    timeout_secs: u64,
}

impl OpenAiRoleModel {
    pub fn new(api_key: &str, model: &str) -> Result<Self, AppError> {
        Self::with_base_url(api_key, model, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: &str, model: &str, base_url: &str) -> Result<Self, AppError> {
        Self::build(api_key, model, base_url, DEFAULT_CLASSIFY_TIMEOUT)
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = provider.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build(
        api_key: &str,
        model: &str,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        if api_key.trim().is_empty() {
            return Err(AppError::ConfigError("API key must not be empty".into()));
        }
        Url::parse(base_url)
            .map_err(|e| AppError::ConfigError(format!("Invalid model base URL '{base_url}': {e}")))?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::HttpError(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            provider: DEFAULT_PROVIDER.to_string(),
            timeout_secs: timeout.as_secs(),
        })
    }
}

// ---- OpenAI API types ----

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

fn chat_request<'a>(model: &'a str, prompt: &'a str) -> ChatRequest<'a> {
    ChatRequest {
        model,
        messages: vec![
            Message {
                role: "system",
                content: SYSTEM_PROMPT,
            },
            Message {
                role: "user",
                content: prompt,
            },
        ],
        temperature: 0.0,
        response_format: ResponseFormat {
            format_type: "json_object",
        },
    }
}

/// Decode a chat response envelope and return its first completion.
///
/// A broken envelope is a [`AppError::SerializationError`]; an envelope
/// without usable content is a [`AppError::MalformedResponse`].
fn parse_chat_response(body: &str) -> Result<String, AppError> {
    let response: ChatResponse = serde_json::from_str(body)?;
    completion_text(response)
}

fn completion_text(response: ChatResponse) -> Result<String, AppError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or_else(|| AppError::MalformedResponse("Empty response from model".into()))
}

impl RoleModel for OpenAiRoleModel {
    fn provider(&self) -> &str {
        &self.provider
    }

    async fn complete(&self, prompt: &str) -> Result<String, AppError> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = chat_request(&self.model, prompt);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::Timeout(self.timeout_secs)
                } else if e.is_connect() {
                    AppError::NetworkError(format!("Connection failed: {e}"))
                } else {
                    AppError::HttpError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let status_code = status.as_u16();
            if status_code == 429 {
                return Err(AppError::RateLimitExceeded);
            }
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| format!("HTTP {status_code}: {body}"));

            return Err(AppError::LlmError {
                message,
                status_code,
                retryable: status_code >= 500,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::HttpError(format!("Failed to read model response: {e}")))?;

        parse_chat_response(&body)
    }
}
