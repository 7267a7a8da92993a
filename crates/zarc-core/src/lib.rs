//! Zarc Core Library
//!
//! Report configuration wizard, report catalog, filtering, viewing and export
//! for the Zarc market-intelligence product.

pub mod catalog;
pub mod config;
pub mod domain;
pub mod export;
pub mod filter;
pub mod metrics;
pub mod notice;
pub mod obs;
pub mod reference;
pub mod taxonomy;
pub mod telemetry;
pub mod viewer;
pub mod wizard;

pub use catalog::{sample_reports, MemoryCatalog, ReportCatalog};
pub use config::{ZarcConfig, DEFAULT_PAGE_SIZE, DEFAULT_SYNTHESIS_DELAY_MS, NOTICE_TTL};

pub use domain::{
    DuplicateNameError, ExportError, NotFoundError, OptionKind, Report, ReportId, ReportSection,
    ReportStatus, Result, SelectOption, ValidationError, ZarcError,
};

pub use export::{
    build_export_document, build_export_sections, compose_sections, export_report,
    flatten_for_capture, sanitize_filename, save_download, DocumentRenderer, ExportDocument,
    ExportFormat, ExportOutcome, JsonRenderer, MarkdownRenderer, PlainTextRenderer,
    RenderedDocument, SectionWriter, TemplateWriter, EXECUTIVE_SUMMARY,
};

pub use filter::{
    filter_by_label, filter_reports, group_by_industry, page_count, paginate, sort_reports,
    IndustryFilter, IndustryGroup, SortMode,
};

pub use metrics::METRICS;
pub use notice::{Notice, NoticeLevel, NoticeQueue};
pub use reference::ReferenceData;
pub use telemetry::init_tracing;
pub use taxonomy::{AdminIndustry, AdminModule, IndustryDraft, IndustryPage, TaxonomyRegistry};
pub use viewer::{NavItem, ReportViewer};
pub use wizard::{ReportWizard, StepStatus, StepperEntry, SynthesisJob, WizardSelection, WizardStep};

/// Zarc version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
