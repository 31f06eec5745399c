//! Errors returned by the chat client library.

use reqwest::StatusCode;

/// Failures of a request to the chat backend.
///
/// Stream-level failures (a backend `error` event, a dropped connection) are
/// not errors: they are reported as a `StreamOutcome` once the stream ends.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Request to backend failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Backend returned status {status} for {url}")]
    Status { status: StatusCode, url: String },
    #[error("Failed to decode backend response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Failed to open event stream: {0}")]
    Channel(String),
    #[error("Invalid backend URL '{0}'")]
    Url(String),
}
