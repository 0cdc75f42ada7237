use std::time::Duration;

use jobscout_core::error::AppError;
use reqwest::Client;

/// Upper bound for one listing-source request.
pub const DEFAULT_SOURCE_TIMEOUT: Duration = Duration::from_secs(20);

// Some boards reject requests without a browser-like agent.
const USER_AGENT: &str = "Mozilla/5.0 (compatible; jobscout/0.1)";

/// HTTP client for public JSON listing APIs.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct JsonClient {
    client: Client,
    timeout_secs: u64,
}

impl JsonClient {
    pub fn new() -> Result<Self, AppError> {
        Self::with_timeout(DEFAULT_SOURCE_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::HttpError(e.to_string()))?;

        Ok(Self {
            client,
            timeout_secs: timeout.as_secs(),
        })
    }

    /// GET `url` and decode the body as JSON.
    pub async fn get_json(&self, url: &str) -> Result<serde_json::Value, AppError> {
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
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
        if status.as_u16() == 429 {
            return Err(AppError::RateLimitExceeded);
        }
        if !status.is_success() {
            return Err(AppError::HttpError(format!(
                "HTTP {} for {}",
                status.as_u16(),
                url
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::HttpError(format!("Failed to read response body: {e}")))?;

        serde_json::from_str(&body)
            .map_err(|e| AppError::MalformedResponse(format!("Invalid JSON from {url}: {e}")))
    }
}
