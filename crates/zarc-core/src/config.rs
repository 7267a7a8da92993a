//! Runtime configuration.
//!
//! Values come from the environment with sensible defaults; binaries layer
//! command-line flags on top.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default simulated generation delay.
pub const DEFAULT_SYNTHESIS_DELAY_MS: u64 = 2_000;

/// Default pagination page size.
pub const DEFAULT_PAGE_SIZE: usize = 15;

/// How long a notice stays visible.
pub const NOTICE_TTL: Duration = Duration::from_secs(3);

/// Zarc configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZarcConfig {
    /// Simulated report generation time, in milliseconds.
    pub synthesis_delay_ms: u64,
    /// Items per page when browsing.
    pub page_size: usize,
    /// Directory exported documents are saved to.
    pub export_dir: PathBuf,
    /// Emit JSON log lines.
    pub log_json: bool,
    /// Start the catalog with the sample reports.
    pub seed_catalog: bool,
}

impl Default for ZarcConfig {
    fn default() -> Self {
        ZarcConfig {
            synthesis_delay_ms: env_parse("ZARC_SYNTHESIS_DELAY_MS")
                .unwrap_or(DEFAULT_SYNTHESIS_DELAY_MS),
            page_size: env_parse("ZARC_PAGE_SIZE")
                .filter(|n: &usize| *n > 0)
                .unwrap_or(DEFAULT_PAGE_SIZE),
            export_dir: std::env::var("ZARC_EXPORT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".")),
            log_json: std::env::var("ZARC_LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
            seed_catalog: env_parse("ZARC_SEED_CATALOG").unwrap_or(true),
        }
    }
}

impl ZarcConfig {
    /// Create a config from environment variables.
    pub fn from_env() -> Self {
        Self::default()
    }

    pub fn synthesis_delay(&self) -> Duration {
        Duration::from_millis(self.synthesis_delay_ms)
    }

    pub fn with_synthesis_delay(mut self, delay: Duration) -> Self {
        self.synthesis_delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn with_export_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.export_dir = dir.into();
        self
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}
