//! Structured observability hooks for the report lifecycle.
//!
//! Every event carries a stable `event` key so log pipelines can filter on
//! it regardless of message wording. Set `ZARC_LOG_FORMAT=json` for JSON.

use std::path::Path;

use tracing::{info, warn};

/// RAII guard that tags everything inside one wizard session.
pub struct WizardSpan {
    _span: tracing::span::EnteredSpan,
}

impl WizardSpan {
    pub fn enter(wizard_id: &str) -> Self {
        Self {
            _span: wizard_span(wizard_id).entered(),
        }
    }
}

/// The span behind [`WizardSpan`], for instrumenting futures.
pub fn wizard_span(wizard_id: &str) -> tracing::Span {
    tracing::info_span!("zarc.wizard", wizard_id = %wizard_id)
}

pub fn emit_industry_selected(industry_id: &str, preselected_modules: usize) {
    info!(
        event = "wizard.industry_selected",
        industry_id = %industry_id,
        preselected_modules = preselected_modules,
    );
}

pub fn emit_generation_started(industry: &str, modules: usize) {
    info!(event = "wizard.generation_started", industry = %industry, modules = modules);
}

pub fn emit_report_generated(report_id: &str, industry: &str, modules: usize) {
    info!(
        event = "report.generated",
        report_id = %report_id,
        industry = %industry,
        modules = modules,
    );
}

pub fn emit_report_added(report_id: &str, catalog_len: usize) {
    info!(event = "catalog.report_added", report_id = %report_id, catalog_len = catalog_len);
}

pub fn emit_export_rendered(report_id: &str, path: &Path, bytes: usize) {
    info!(
        event = "export.rendered",
        report_id = %report_id,
        path = %path.display(),
        bytes = bytes,
    );
}

/// Export failures are warnings: the report itself is intact.
pub fn emit_export_failed(report_id: &str, error: &dyn std::fmt::Display) {
    warn!(event = "export.failed", report_id = %report_id, error = %error);
}

pub fn emit_taxonomy_rejected(action: &str, error: &dyn std::fmt::Display) {
    warn!(event = "taxonomy.rejected", action = %action, error = %error);
}
