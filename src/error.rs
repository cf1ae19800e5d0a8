// Error types for the data-access layer. The CLI layer decides how these
// are presented; nothing in `api` prints.

use reqwest::StatusCode;
use thiserror::Error;

/// Failures surfaced by `api::ApiClient` and `api::Session`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (DNS, TLS, connection reset...).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("server returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// The response body was not the JSON shape we expected.
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// HTTP status of the failed call, if the server answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Http(e) => e.status(),
            ApiError::Decode(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
