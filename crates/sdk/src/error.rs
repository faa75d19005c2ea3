//! Error types for the CourtListener and eCFR clients.

use courtlistener_core::CoreError;
use serde::Deserialize;

/// Result type for SDK operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Longest response body excerpt kept in an error.
const MAX_DETAIL_LEN: usize = 500;

/// Error types that can occur when calling an upstream API.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Upstream returned a non-success status.
    #[error("API error (status {status}): {message}")]
    Api {
        status: u16,
        message: String,
        details: Option<String>,
    },

    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Request exceeded its deadline.
    #[error("Request timed out")]
    Timeout,

    /// Response body did not match the expected schema.
    #[error("Failed to decode {context}: {source}")]
    Decode {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// eCFR XML could not be parsed.
    #[error("XML error: {0}")]
    Xml(String),

    /// Caller supplied an invalid parameter.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Client is misconfigured (missing key, bad base URL).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Local or upstream rate limit exhausted.
    #[error("Rate limited, retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    /// Resource not found.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl Error {
    /// Upstream HTTP status, if this error came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::RateLimited { .. } => Some(429),
            _ => None,
        }
    }

    /// Create an API error from a status code and response body.
    ///
    /// Django REST Framework errors carry a `detail` field; any other body is
    /// kept (truncated) as `details`.
    pub fn from_response(status: u16, body: &str) -> Self {
        if let Ok(ErrorResponse { detail: Some(detail) }) =
            serde_json::from_str::<ErrorResponse>(body)
        {
            return Self::Api {
                status,
                message: detail,
                details: None,
            };
        }

        let body = body.trim();
        let message = reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("Request failed")
            .to_string();
        let details = if body.is_empty() {
            None
        } else {
            Some(truncate(body, MAX_DETAIL_LEN))
        };
        Self::Api {
            status,
            message,
            details,
        }
    }
}

impl From<CoreError> for Error {
    fn from(err: CoreError) -> Self {
        Self::Xml(err.to_string())
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.len() <= max {
        return text.to_string();
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

/// Error body returned by CourtListener.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    detail: Option<String>,
}
