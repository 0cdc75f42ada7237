use thiserror::Error;

/// Application-wide error types for jobscout.
#[derive(Error, Debug)]
pub enum AppError {
    /// HTTP request failed (listing source or classification service).
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Classification service returned a non-success status.
    #[error("LLM error (HTTP {status_code}): {message}")]
    LlmError {
        message: String,
        status_code: u16,
        retryable: bool,
    },

    /// A response arrived but its body is not the expected structured payload.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// JSON serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Request timed out.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Network/connection error.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Store operation failed.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Missing or invalid configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl AppError {
    /// Returns true if this error is a transport-level hiccup worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::NetworkError(_) | AppError::Timeout(_) | AppError::RateLimitExceeded => true,
            AppError::LlmError { retryable, .. } => *retryable,
            AppError::HttpError(msg) => {
                msg.contains("timeout") || msg.contains("connect") || msg.contains("reset")
            }
            _ => false,
        }
    }

    /// Returns true if the remote side answered with a body we can never parse.
    ///
    /// Retrying the same request will not change the outcome.
    pub fn is_malformed_response(&self) -> bool {
        matches!(self, AppError::MalformedResponse(_))
    }
}
