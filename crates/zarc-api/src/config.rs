//! Backend connection settings.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default backend base URL.
pub const DEFAULT_API_URL: &str = "https://zarc-development.onrender.com";

/// Default location of the persisted access token.
pub const DEFAULT_TOKEN_PATH: &str = ".zarc/token";

/// API client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL, without trailing slash
    pub base_url: String,
    /// File the bearer token is kept in
    pub token_path: PathBuf,
    /// Per-request timeout, in seconds
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            base_url: std::env::var("ZARC_API_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            token_path: std::env::var("ZARC_TOKEN_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_TOKEN_PATH)),
            timeout_secs: std::env::var("ZARC_API_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(30),
        }
    }
}

impl ApiConfig {
    /// Create a config from environment variables
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Config for a specific server
    pub fn new(base_url: &str, token_path: impl Into<PathBuf>) -> Self {
        ApiConfig {
            base_url: base_url.trim_end_matches('/').to_string(),
            token_path: token_path.into(),
            timeout_secs: 30,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Absolute URL for `endpoint` (which starts with `/`).
    pub fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }
}
