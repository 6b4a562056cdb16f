//! Error types for remote operations

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Backend is not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out ({0}s)")]
    Timeout(u64),

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Could not read {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Unexpected response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl BackendError {
    /// Classify a reqwest error the way the status bar reports it
    pub fn from_request(err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            BackendError::Timeout(timeout_secs)
        } else if err.is_connect() {
            BackendError::Connect(err.to_string())
        } else {
            BackendError::Http(err)
        }
    }
}

pub type BackendResult<T> = Result<T, BackendError>;
