use reqwest::StatusCode;
use thiserror::Error;

use crate::domain::ports::GatewayError;

/// Errors that can occur when interacting with the Claude API
#[derive(Error, Debug)]
pub enum ClaudeApiError {
    /// Invalid request parameters (HTTP 400)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Invalid or missing API key (HTTP 401)
    #[error("Invalid API key - authentication failed")]
    InvalidApiKey,

    /// Forbidden - permission denied (HTTP 403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Resource not found (HTTP 404)
    #[error("Resource not found")]
    NotFound,

    /// Rate limit exceeded (HTTP 429)
    #[error("Rate limit exceeded - too many requests")]
    RateLimitExceeded,

    /// Server error from Claude API (HTTP 500, 502, 503, 504, 529)
    #[error("Server error ({0}): {1}")]
    ServerError(StatusCode, String),

    /// Network or connection error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Request timeout
    #[error("Request timeout")]
    Timeout,

    /// `error` event received mid-stream
    #[error("Stream error ({error_type}): {message}")]
    StreamError { error_type: String, message: String },

    /// Response carried no text content
    #[error("Response contained no text content")]
    EmptyResponse,

    /// Client could not be built from the given settings
    #[error("Invalid client configuration: {0}")]
    Configuration(String),

    /// Unknown or unexpected error
    #[error("Unknown error ({0}): {1}")]
    UnknownError(StatusCode, String),
}

impl ClaudeApiError {
    /// Classify a non-success HTTP status
    pub fn from_status(status: StatusCode, body: String) -> Self {
        match status {
            StatusCode::BAD_REQUEST => Self::InvalidRequest(body),
            StatusCode::UNAUTHORIZED => Self::InvalidApiKey,
            StatusCode::FORBIDDEN => Self::Forbidden(body),
            StatusCode::NOT_FOUND => Self::NotFound,
            StatusCode::TOO_MANY_REQUESTS => Self::RateLimitExceeded,
            status if status.is_server_error() => Self::ServerError(status, body),
            _ => Self::UnknownError(status, body),
        }
    }

    /// Returns true if this error is transient and should be retried
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RateLimitExceeded | Self::ServerError(_, _) | Self::Timeout => true,
            Self::NetworkError(err) => !err.is_decode() && !err.is_builder(),
            _ => false,
        }
    }

    /// Returns true if this is a permanent error that should not be retried
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            Self::InvalidRequest(_)
                | Self::InvalidApiKey
                | Self::Forbidden(_)
                | Self::NotFound
                | Self::Configuration(_)
        )
    }
}

impl From<ClaudeApiError> for GatewayError {
    fn from(err: ClaudeApiError) -> Self {
        match err {
            ClaudeApiError::InvalidRequest(message) => Self::Rejected {
                status: 400,
                message,
            },
            ClaudeApiError::InvalidApiKey => Self::Rejected {
                status: 401,
                message: "invalid API key".to_string(),
            },
            ClaudeApiError::Forbidden(message) => Self::Rejected {
                status: 403,
                message,
            },
            ClaudeApiError::NotFound => Self::Rejected {
                status: 404,
                message: "resource not found".to_string(),
            },
            ClaudeApiError::RateLimitExceeded => {
                Self::RateLimited("too many requests".to_string())
            }
            ClaudeApiError::ServerError(status, body) => {
                Self::Unavailable(format!("{status}: {body}"))
            }
            ClaudeApiError::NetworkError(err) if err.is_timeout() => Self::Timeout,
            ClaudeApiError::NetworkError(err) => Self::Unavailable(err.to_string()),
            ClaudeApiError::Timeout => Self::Timeout,
            ClaudeApiError::StreamError {
                error_type,
                message,
            } => Self::Stream(format!("{error_type}: {message}")),
            ClaudeApiError::JsonError(err) => Self::Stream(err.to_string()),
            ClaudeApiError::EmptyResponse => Self::Stream("empty response".to_string()),
            ClaudeApiError::Configuration(message) => Self::Configuration(message),
            ClaudeApiError::UnknownError(status, message) => Self::Rejected {
                status: status.as_u16(),
                message,
            },
        }
    }
}
