//! Error types for zarc-api

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur talking to the Zarc backend
#[derive(Error, Debug)]
pub enum ApiError {
    /// Transport-level failure (DNS, TLS, connection reset, timeout)
    #[error("HTTP error: {0}")]
    Http(String),

    /// The server answered with a non-2xx status
    #[error("{detail} (HTTP {status})")]
    Status { status: u16, detail: String },

    /// The response body was not the JSON we expected
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Reading or writing the persisted token failed
    #[error("token store {}: {source}", path.display())]
    Token {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A request was rejected before being sent
    #[error("invalid request: {0}")]
    Invalid(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Http(err.to_string())
    }
}

impl ApiError {
    /// HTTP status for server-side rejections.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type for zarc-api operations
pub type Result<T> = std::result::Result<T, ApiError>;
