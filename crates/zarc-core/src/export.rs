//! Export content shaping and document rendering.
//!
//! A report is shaped into an ordered list of sections (executive summary
//! first, then one per module) plus a title/industry/date header. Renderers
//! turn that [`ExportDocument`] into bytes; [`save_download`] writes them out.
//!
//! Rendering failures are returned to the caller and never touch the catalog,
//! so an export can always be retried without regenerating the report.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::OnceLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::ReportCatalog;
use crate::domain::{ExportError, NotFoundError, Report, ReportId, ReportSection};
use crate::metrics::METRICS;
use crate::obs;

/// Title of the leading section of every export.
pub const EXECUTIVE_SUMMARY: &str = "Executive Summary";

/// Heading used when a document arrives with no sections at all.
pub const DEFAULT_SUMMARY_TITLE: &str = "Report Summary";

/// Body used when a document arrives with no sections at all.
pub const DEFAULT_SUMMARY_BODY: &str = "This is your generated intelligence dossier. Review the details and insights provided in this document.";

// ---------------------------------------------------------------------------
// Section content
// ---------------------------------------------------------------------------

/// Produces the body text of report sections.
///
/// The stock [`TemplateWriter`] fills in boilerplate; a real analysis engine
/// can be dropped in behind the same trait.
pub trait SectionWriter: Send + Sync {
    fn executive_summary(&self, industry: &str, modules: &[String]) -> String;

    fn module_section(&self, industry: &str, module: &str) -> String;
}

/// Placeholder prose parameterized by industry and module name.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateWriter;

impl SectionWriter for TemplateWriter {
    fn executive_summary(&self, industry: &str, modules: &[String]) -> String {
        format!(
            "This report covers the {industry} sector across {count} analysis module{plural}. \
             Key findings indicate that incumbents must accelerate digital transformation \
             initiatives to maintain market share. Supply chain optimization and \
             customer-centric value propositions are emerging as the primary differentiators \
             for the upcoming fiscal year. The outlook remains positive for {industry} \
             organizations willing to pivot towards data-driven decision making.",
            count = modules.len(),
            plural = if modules.len() == 1 { "" } else { "s" },
        )
    }

    fn module_section(&self, industry: &str, module: &str) -> String {
        format!(
            "This section provides a detailed breakdown of {module} within the context of the \
             {industry} market for the current financial year. Data from multiple touchpoints \
             has been synthesized into a granular view of emerging patterns and anomalies. \
             A more agile approach to resource allocation is recommended, together with a \
             review of risk mitigation strategies across the supply chain."
        )
    }
}

/// Executive summary followed by one section per module, in module order.
pub fn compose_sections(
    industry: &str,
    modules: &[String],
    writer: &dyn SectionWriter,
) -> Vec<ReportSection> {
    let mut sections = Vec::with_capacity(modules.len() + 1);
    sections.push(ReportSection::new(
        EXECUTIVE_SUMMARY,
        writer.executive_summary(industry, modules),
    ));
    sections.extend(
        modules
            .iter()
            .map(|m| ReportSection::new(m.clone(), writer.module_section(industry, m))),
    );
    sections
}

/// Sections to export for `report`.
///
/// Uses the sections stored at generation time when present, otherwise
/// composes them from the template writer.
pub fn build_export_sections(report: &Report) -> Vec<ReportSection> {
    build_export_sections_with(report, &TemplateWriter)
}

pub fn build_export_sections_with(report: &Report, writer: &dyn SectionWriter) -> Vec<ReportSection> {
    match &report.sections {
        Some(stored) if !stored.is_empty() => stored.clone(),
        _ => compose_sections(&report.industry, &report.modules, writer),
    }
}

// ---------------------------------------------------------------------------
// Export document
// ---------------------------------------------------------------------------

/// Fully resolved content handed to a renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub title: String,
    pub industry: String,
    pub created_at: DateTime<Utc>,
    pub sections: Vec<ReportSection>,
}

impl ExportDocument {
    pub fn from_report(report: &Report) -> Self {
        Self {
            title: report.title.clone(),
            industry: report.industry.clone(),
            created_at: report.created_at,
            sections: build_export_sections(report),
        }
    }

    /// Keep only the section titled `title` (case-insensitive).
    pub fn only_section(mut self, title: &str) -> Result<Self, NotFoundError> {
        let wanted = title.to_lowercase();
        self.sections.retain(|s| s.title.to_lowercase() == wanted);
        if self.sections.is_empty() {
            return Err(NotFoundError::Section(title.to_string()));
        }
        Ok(self)
    }

    /// "Monday, October 14, 2024"
    pub fn generated_on(&self) -> String {
        self.created_at.format("%A, %B %-d, %Y").to_string()
    }
}

/// Resolve `id` in the catalog and shape it for export.
pub fn build_export_document(
    catalog: &dyn ReportCatalog,
    id: &ReportId,
) -> Result<ExportDocument, ExportError> {
    let report = catalog.get(id)?;
    Ok(ExportDocument::from_report(&report))
}

// ---------------------------------------------------------------------------
// Renderers
// ---------------------------------------------------------------------------

/// Rendered bytes plus what to call them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub bytes: Vec<u8>,
    pub mime: &'static str,
    pub extension: &'static str,
}

/// Turns an [`ExportDocument`] into a downloadable blob.
///
/// Implementations must keep section order and must produce a valid document
/// for an empty section list.
#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    async fn render(&self, document: &ExportDocument) -> Result<RenderedDocument, ExportError>;
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    #[default]
    Markdown,
    Text,
    Json,
}

impl ExportFormat {
    pub fn renderer(self) -> Box<dyn DocumentRenderer> {
        match self {
            ExportFormat::Markdown => Box::new(MarkdownRenderer),
            ExportFormat::Text => Box::new(PlainTextRenderer),
            ExportFormat::Json => Box::new(JsonRenderer),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(ExportFormat::Markdown),
            "text" | "txt" | "print" => Ok(ExportFormat::Text),
            "json" => Ok(ExportFormat::Json),
            other => Err(format!("unknown export format: {other}")),
        }
    }
}

/// Word-processor style document as Markdown.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownRenderer;

#[async_trait]
impl DocumentRenderer for MarkdownRenderer {
    async fn render(&self, document: &ExportDocument) -> Result<RenderedDocument, ExportError> {
        Ok(RenderedDocument {
            bytes: render_markdown(document).into_bytes(),
            mime: "text/markdown; charset=utf-8",
            extension: "md",
        })
    }
}

/// Render the document as Markdown.
pub fn render_markdown(document: &ExportDocument) -> String {
    let mut out = String::new();
    out.push_str(&format!("# {}\n\n", document.title));
    out.push_str(&format!("_Industry: {}_\n\n", document.industry));
    out.push_str(&format!("Generated on: {}\n\n", document.generated_on()));
    out.push_str("---\n\n");

    if document.sections.is_empty() {
        out.push_str(&format!("## {}\n\n{}\n", DEFAULT_SUMMARY_TITLE, DEFAULT_SUMMARY_BODY));
        return out;
    }

    for section in &document.sections {
        out.push_str(&format!("## {}\n\n{}\n\n", section.title, section.content));
    }
    out
}

/// Print/capture output: flattened plain text with no markup.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextRenderer;

#[async_trait]
impl DocumentRenderer for PlainTextRenderer {
    async fn render(&self, document: &ExportDocument) -> Result<RenderedDocument, ExportError> {
        let flat = flatten_document(document);
        let mut out = String::new();
        out.push_str(&flat.title.to_uppercase());
        out.push('\n');
        out.push_str(&format!("Industry: {}\n", flat.industry));
        out.push_str(&format!("Generated on: {}\n", flat.generated_on()));
        out.push_str(&"=".repeat(72));
        out.push_str("\n\n");

        let sections = if flat.sections.is_empty() {
            vec![ReportSection::new(DEFAULT_SUMMARY_TITLE, DEFAULT_SUMMARY_BODY)]
        } else {
            flat.sections
        };
        for section in &sections {
            out.push_str(&section.title);
            out.push('\n');
            out.push_str(&"-".repeat(section.title.chars().count()));
            out.push_str("\n\n");
            out.push_str(&section.content);
            out.push_str("\n\n");
        }

        Ok(RenderedDocument {
            bytes: out.into_bytes(),
            mime: "text/plain; charset=utf-8",
            extension: "txt",
        })
    }
}

/// The export document as pretty JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

#[async_trait]
impl DocumentRenderer for JsonRenderer {
    async fn render(&self, document: &ExportDocument) -> Result<RenderedDocument, ExportError> {
        let bytes =
            serde_json::to_vec_pretty(document).map_err(|e| ExportError::Render(e.to_string()))?;
        Ok(RenderedDocument {
            bytes,
            mime: "application/json",
            extension: "json",
        })
    }
}

/// Tags, inline code ticks and leading heading markers.
fn markup_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?m)<[^>]*>|`+|^[ \t]*#{1,6}[ \t]+").expect("valid markup pattern")
    })
}

/// Paired emphasis; the captured text is kept.
fn emphasis_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\*\*([^*\n]+)\*\*|__([^_\n]+)__|\*([^*\n]+)\*")
            .expect("valid emphasis pattern")
    })
}

fn unsafe_filename_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[^A-Za-z0-9._-]+").expect("valid filename pattern"))
}

/// Strip markup and control characters and collapse whitespace in each line.
///
/// Capture-based exporters get plain resolved text only.
pub fn flatten_for_capture(text: &str) -> String {
    let stripped = markup_pattern().replace_all(text, "");
    let stripped = emphasis_pattern().replace_all(&stripped, "${1}${2}${3}");
    stripped
        .lines()
        .map(|line| {
            line.chars()
                .map(|c| if c.is_control() { ' ' } else { c })
                .collect::<String>()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Apply [`flatten_for_capture`] to every text field of `document`.
pub fn flatten_document(document: &ExportDocument) -> ExportDocument {
    ExportDocument {
        title: flatten_for_capture(&document.title),
        industry: flatten_for_capture(&document.industry),
        created_at: document.created_at,
        sections: document
            .sections
            .iter()
            .map(|s| ReportSection::new(flatten_for_capture(&s.title), flatten_for_capture(&s.content)))
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Downloads
// ---------------------------------------------------------------------------

/// Replace whitespace and unsafe characters with `_`.
pub fn sanitize_filename(name: &str) -> String {
    let cleaned = unsafe_filename_pattern().replace_all(name.trim(), "_");
    let cleaned = cleaned.trim_matches('_');
    if cleaned.is_empty() {
        "report".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Download name built from the report title and, when given, the section.
pub fn export_filename(title: &str, section: Option<&str>, extension: &str) -> String {
    let stem = match section {
        Some(section) => format!("{}_{}", sanitize_filename(title), sanitize_filename(section)),
        None => sanitize_filename(title),
    };
    format!("{stem}.{extension}")
}

/// Write `bytes` to `dir/filename`, creating `dir` if needed.
pub fn save_download(dir: &Path, filename: &str, bytes: &[u8]) -> Result<PathBuf, ExportError> {
    std::fs::create_dir_all(dir).map_err(|source| ExportError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let path = dir.join(filename);
    std::fs::write(&path, bytes).map_err(|source| ExportError::Io {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

/// Where an export landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOutcome {
    pub path: PathBuf,
    pub bytes_written: usize,
}

/// Resolve, shape, render and save one report (optionally one section of it).
pub async fn export_report(
    catalog: &dyn ReportCatalog,
    id: &ReportId,
    section: Option<&str>,
    renderer: &dyn DocumentRenderer,
    dir: &Path,
) -> Result<ExportOutcome, ExportError> {
    let result = export_inner(catalog, id, section, renderer, dir).await;
    match &result {
        Ok(outcome) => {
            METRICS.inc_exports_rendered();
            obs::emit_export_rendered(id.as_str(), &outcome.path, outcome.bytes_written);
        }
        Err(err) => {
            METRICS.inc_export_failures();
            obs::emit_export_failed(id.as_str(), err);
        }
    }
    result
}

async fn export_inner(
    catalog: &dyn ReportCatalog,
    id: &ReportId,
    section: Option<&str>,
    renderer: &dyn DocumentRenderer,
    dir: &Path,
) -> Result<ExportOutcome, ExportError> {
    let mut document = build_export_document(catalog, id)?;
    if let Some(section) = section {
        document = document.only_section(section)?;
    }
    debug!(report_id = %id, sections = document.sections.len(), "rendering export");

    let rendered = renderer.render(&document).await?;
    let section_title = section
        .and(document.sections.first())
        .map(|s| s.title.as_str());
    let filename = export_filename(&document.title, section_title, rendered.extension);
    let path = save_download(dir, &filename, &rendered.bytes)?;
    Ok(ExportOutcome {
        path,
        bytes_written: rendered.bytes.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ReportStatus;
    use chrono::TimeZone;

    fn report(modules: &[&str]) -> Report {
        Report {
            id: ReportId::from("REP-100"),
            title: "Solar Energy Analysis".to_string(),
            industry: "Solar Energy".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 10, 14, 9, 30, 0).unwrap(),
            file_size: "1.2 MB".to_string(),
            status: ReportStatus::Completed,
            modules: modules.iter().map(|m| m.to_string()).collect(),
            sections: None,
        }
    }

    #[test]
    fn test_sections_start_with_summary_then_modules_in_order() {
        let r = report(&["SWOT Analysis", "PESTLE Framework"]);
        let sections = build_export_sections(&r);
        let titles: Vec<_> = sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec![EXECUTIVE_SUMMARY, "SWOT Analysis", "PESTLE Framework"]);
        assert!(sections[0].content.contains("Solar Energy"));
        assert!(sections[1].content.contains("SWOT Analysis"));
    }

    #[test]
    fn test_zero_module_report_is_summary_only() {
        let sections = build_export_sections(&report(&[]));
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, EXECUTIVE_SUMMARY);
    }

    #[test]
    fn test_stored_sections_take_priority() {
        let mut r = report(&["SWOT Analysis"]);
        r.sections = Some(vec![ReportSection::new(EXECUTIVE_SUMMARY, "stored body")]);
        let sections = build_export_sections(&r);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].content, "stored body");
    }

    #[test]
    fn test_generated_on_long_date() {
        let doc = ExportDocument::from_report(&report(&[]));
        assert_eq!(doc.generated_on(), "Monday, October 14, 2024");
    }

    #[test]
    fn test_markdown_without_sections_uses_default_summary() {
        let mut doc = ExportDocument::from_report(&report(&[]));
        doc.sections.clear();
        let md = render_markdown(&doc);
        assert!(md.starts_with("# Solar Energy Analysis\n"));
        assert!(md.contains("## Report Summary"));
        assert!(md.contains(DEFAULT_SUMMARY_BODY));
    }

    #[test]
    fn test_markdown_keeps_section_order() {
        let doc = ExportDocument::from_report(&report(&["B", "A"]));
        let md = render_markdown(&doc);
        let summary = md.find("## Executive Summary").unwrap();
        let b = md.find("## B").unwrap();
        let a = md.find("## A").unwrap();
        assert!(summary < b && b < a);
    }

    #[test]
    fn test_only_section_filters_or_fails() {
        let doc = ExportDocument::from_report(&report(&["SWOT Analysis"]));
        let single = doc.clone().only_section("swot analysis").unwrap();
        assert_eq!(single.sections.len(), 1);

        let err = doc.only_section("Nope").unwrap_err();
        assert_eq!(err, NotFoundError::Section("Nope".to_string()));
    }

    #[test]
    fn test_flatten_strips_markup_and_controls() {
        let flat = flatten_for_capture("  <b>Bold</b>   **text**\twith\u{7}bell \n  # Heading  ");
        assert_eq!(flat, "Bold text with bell\nHeading");
    }

    #[test]
    fn test_flatten_keeps_plain_symbols() {
        assert_eq!(
            flatten_for_capture("C# and F# teams use snake_case ids, issue #42"),
            "C# and F# teams use snake_case ids, issue #42"
        );
        assert_eq!(
            flatten_for_capture("## Risks\n__Key__ *drivers* and `code`"),
            "Risks\nKey drivers and code"
        );
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(
            sanitize_filename("Q4 E-commerce Market Trends & Competitor Analysis"),
            "Q4_E-commerce_Market_Trends_Competitor_Analysis"
        );
        assert_eq!(sanitize_filename("  /// "), "report");
        assert_eq!(
            export_filename("Fintech Payments Analysis", Some("Market Size (TAM/SAM/SOM)"), "md"),
            "Fintech_Payments_Analysis_Market_Size_TAM_SAM_SOM.md"
        );
    }

    #[test]
    fn test_export_format_parse() {
        assert_eq!("md".parse::<ExportFormat>().unwrap(), ExportFormat::Markdown);
        assert_eq!("print".parse::<ExportFormat>().unwrap(), ExportFormat::Text);
        assert!("docx".parse::<ExportFormat>().is_err());
    }

    #[tokio::test]
    async fn test_plain_text_renderer_has_no_markup() {
        let mut r = report(&["SWOT Analysis"]);
        r.title = "<i>Solar</i> **Report**".to_string();
        let doc = ExportDocument::from_report(&r);
        let rendered = PlainTextRenderer.render(&doc).await.unwrap();
        let text = String::from_utf8(rendered.bytes).unwrap();
        assert!(text.starts_with("SOLAR REPORT\n"));
        assert!(!text.contains('<'));
        assert!(!text.contains("**"));
        assert_eq!(rendered.extension, "txt");
    }
}
