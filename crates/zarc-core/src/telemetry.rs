//! Tracing initialisation for Zarc binaries.
//!
//! Call [`init_tracing`] once at program start. Later calls are ignored
//! because the global subscriber can only be set once per process.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Filter directives read before `RUST_LOG`, e.g. `ZARC_LOG=zarc_core=debug`.
pub const LOG_ENV: &str = "ZARC_LOG";

/// Initialise the global tracing subscriber.
///
/// With `json` set, events are newline-delimited JSON. `level` applies when
/// neither `ZARC_LOG` nor `RUST_LOG` is set. Logs go to stderr so command
/// output on stdout stays clean.
pub fn init_tracing(json: bool, level: Level) {
    let layer = fmt::layer().with_target(false).with_writer(std::io::stderr);
    let registry = tracing_subscriber::registry().with(filter_for(level));

    if json {
        registry.with(layer.json()).try_init().ok();
    } else {
        registry.with(layer).try_init().ok();
    }
}

fn filter_for(level: Level) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(level.as_str()))
}
