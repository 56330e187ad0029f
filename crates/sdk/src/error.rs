//! Error types for the Zenodo SDK.

use serde::{Deserialize, Serialize};

/// Result type for SDK operations.
pub type ZenodoResult<T> = Result<T, ZenodoError>;

/// Error types that can occur when talking to the Zenodo API.
#[derive(Debug, thiserror::Error)]
pub enum ZenodoError {
    /// Network-level failure (connection refused, DNS, TLS, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API rejected the credentials (401 or 403).
    #[error("Authentication failed (status {status}): {message}")]
    Authentication { status: u16, message: String },

    /// API returned any other error status.
    #[error("API error (status {status}): {message}")]
    Api {
        status: u16,
        message: String,
        details: Option<String>,
    },

    /// The request did not complete within the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// Serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ZenodoError {
    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(_) | Self::Timeout => true,
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Whether this error is a 404 from the API.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { status: 404, .. })
    }

    /// Create an error from a non-success status code and response body.
    pub fn from_response(status: u16, body: &str) -> Self {
        let (message, details) = match serde_json::from_str::<ErrorResponse>(body) {
            Ok(parsed) => (parsed.message, parsed.details),
            Err(_) => (body.to_string(), None),
        };

        match status {
            401 | 403 => Self::Authentication { status, message },
            _ => Self::Api {
                status,
                message,
                details,
            },
        }
    }
}

impl ZenodoError {
    /// Map a transport failure, separating timeouts from other network errors.
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Http(err)
        }
    }
}

/// Error body returned by the Zenodo API.
///
/// Zenodo reports `{"status": 404, "message": "..."}`; the `error` alias
/// covers proxies that use the more common key.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(alias = "error")]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}
