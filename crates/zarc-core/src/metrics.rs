//! Global atomic counters for Zarc observability.
//!
//! Counters are incremented silently at the call site. Call
//! [`Metrics::flush`] to emit current values as a single
//! `tracing::info!` event (e.g. when a CLI command finishes).

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

/// Lightweight atomic counters.
pub struct Metrics {
    reports_generated: AtomicU64,
    exports_rendered: AtomicU64,
    export_failures: AtomicU64,
    validation_rejections: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            reports_generated: AtomicU64::new(0),
            exports_rendered: AtomicU64::new(0),
            export_failures: AtomicU64::new(0),
            validation_rejections: AtomicU64::new(0),
        }
    }

    pub fn inc_reports_generated(&self) {
        self.reports_generated.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "reports_generated", "counter incremented");
    }

    pub fn inc_exports_rendered(&self) {
        self.exports_rendered.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "exports_rendered", "counter incremented");
    }

    pub fn inc_export_failures(&self) {
        self.export_failures.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "export_failures", "counter incremented");
    }

    /// A guarded action was attempted without its precondition.
    pub fn inc_validation_rejections(&self) {
        self.validation_rejections.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "validation_rejections", "counter incremented");
    }

    /// Emit all current counter values as a single `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            reports_generated = self.reports_generated(),
            exports_rendered = self.exports_rendered(),
            export_failures = self.export_failures(),
            validation_rejections = self.validation_rejections(),
        );
    }

    pub fn reports_generated(&self) -> u64 {
        self.reports_generated.load(Ordering::Relaxed)
    }

    pub fn exports_rendered(&self) -> u64 {
        self.exports_rendered.load(Ordering::Relaxed)
    }

    pub fn export_failures(&self) -> u64 {
        self.export_failures.load(Ordering::Relaxed)
    }

    pub fn validation_rejections(&self) -> u64 {
        self.validation_rejections.load(Ordering::Relaxed)
    }

    /// Reset all counters to zero (useful in tests).
    pub fn reset(&self) {
        self.reports_generated.store(0, Ordering::Relaxed);
        self.exports_rendered.store(0, Ordering::Relaxed);
        self.export_failures.store(0, Ordering::Relaxed);
        self.validation_rejections.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_increment() {
        let m = Metrics::new();
        assert_eq!(m.reports_generated(), 0);
        m.inc_reports_generated();
        m.inc_reports_generated();
        assert_eq!(m.reports_generated(), 2);

        m.inc_exports_rendered();
        assert_eq!(m.exports_rendered(), 1);

        m.inc_export_failures();
        m.inc_validation_rejections();
        m.inc_validation_rejections();
        assert_eq!(m.export_failures(), 1);
        assert_eq!(m.validation_rejections(), 2);
    }

    #[test]
    fn reset_zeroes_all() {
        let m = Metrics::new();
        m.inc_reports_generated();
        m.inc_exports_rendered();
        m.inc_export_failures();
        m.inc_validation_rejections();
        m.reset();
        assert_eq!(m.reports_generated(), 0);
        assert_eq!(m.exports_rendered(), 0);
        assert_eq!(m.export_failures(), 0);
        assert_eq!(m.validation_rejections(), 0);
    }
}
