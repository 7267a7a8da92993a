//! Generated report records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a report.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportId(pub String);

impl ReportId {
    /// Generate a new random id of the form `REP-XXXXXXXXXXXX`.
    pub fn generate() -> Self {
        let raw = uuid::Uuid::new_v4().simple().to_string();
        ReportId(format!("REP-{}", raw[..12].to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ReportId {
    fn from(s: &str) -> Self {
        ReportId(s.to_string())
    }
}

impl std::fmt::Display for ReportId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle status of a report.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Completed,
    Processing,
    Failed,
}

/// A titled block of report content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSection {
    pub title: String,
    pub content: String,
}

impl ReportSection {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }
}

/// A generated report.
///
/// `industry` and `modules` are label snapshots taken at generation time.
/// Later edits to the reference lists never reach back into stored reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Unique identifier, fixed at creation.
    pub id: ReportId,

    /// Display title, e.g. "Fintech Payments Analysis".
    pub title: String,

    /// Industry label.
    pub industry: String,

    /// When the report was generated.
    pub created_at: DateTime<Utc>,

    /// Cosmetic size label such as "2.4 MB".
    pub file_size: String,

    pub status: ReportStatus,

    /// Module labels in selection order.
    pub modules: Vec<String>,

    /// Pre-rendered sections, when the generator produced them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sections: Option<Vec<ReportSection>>,
}

impl Report {
    /// Title used for reports produced by the wizard.
    pub fn title_for(industry_label: &str) -> String {
        format!("{} Analysis", industry_label)
    }
}
