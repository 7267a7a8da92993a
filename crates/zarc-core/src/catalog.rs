//! Report catalog store.
//!
//! `ReportCatalog` is the single source of truth every view reads from.
//! Reports are prepended, so `list_all` is newest-first by insertion.
//! `MemoryCatalog` keeps the records for the lifetime of the process.

use std::sync::{Mutex, MutexGuard};

use chrono::{TimeZone, Utc};

use crate::domain::{NotFoundError, Report, ReportId, ReportStatus};
use crate::obs;

/// Ordered, shared collection of generated reports.
///
/// Guarantees:
/// - `add(r)` followed by `list_all()` yields `[r, ...previous]`.
/// - Stored reports are never mutated.
pub trait ReportCatalog: Send + Sync {
    /// All reports, most recently added first.
    fn list_all(&self) -> Vec<Report>;

    /// Insert `report` at the front.
    fn add(&self, report: Report);

    /// Look up a report by id.
    fn get(&self, id: &ReportId) -> Result<Report, NotFoundError>;

    /// Whether a report with `id` is present.
    fn contains(&self, id: &ReportId) -> bool {
        self.get(id).is_ok()
    }

    fn len(&self) -> usize {
        self.list_all().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory catalog backed by a `Vec<Report>`.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    reports: Mutex<Vec<Report>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A catalog pre-filled with the sample reports.
    pub fn seeded() -> Self {
        let catalog = Self::new();
        for report in sample_reports().into_iter().rev() {
            catalog.add(report);
        }
        catalog
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Report>> {
        self.reports.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ReportCatalog for MemoryCatalog {
    fn list_all(&self) -> Vec<Report> {
        self.lock().clone()
    }

    fn add(&self, report: Report) {
        let id = report.id.clone();
        let mut reports = self.lock();
        reports.insert(0, report);
        obs::emit_report_added(id.as_str(), reports.len());
    }

    fn get(&self, id: &ReportId) -> Result<Report, NotFoundError> {
        self.lock()
            .iter()
            .find(|r| &r.id == id)
            .cloned()
            .ok_or_else(|| NotFoundError::Report(id.clone()))
    }

    fn contains(&self, id: &ReportId) -> bool {
        self.lock().iter().any(|r| &r.id == id)
    }

    fn len(&self) -> usize {
        self.lock().len()
    }
}

/// The five sample reports the product ships with, in listing order.
pub fn sample_reports() -> Vec<Report> {
    fn sample(
        id: &str,
        title: &str,
        industry: &str,
        (year, month, day): (i32, u32, u32),
        size: &str,
        modules: &[&str],
    ) -> Report {
        Report {
            id: ReportId::from(id),
            title: title.to_string(),
            industry: industry.to_string(),
            created_at: Utc
                .with_ymd_and_hms(year, month, day, 0, 0, 0)
                .single()
                .unwrap_or_default(),
            file_size: size.to_string(),
            status: ReportStatus::Completed,
            modules: modules.iter().map(|m| m.to_string()).collect(),
            sections: None,
        }
    }

    vec![
        sample(
            "REP-001",
            "Q4 E-commerce Market Trends & Competitor Analysis",
            "E-commerce",
            (2024, 10, 15),
            "2.4 MB",
            &[
                "Market Analysis",
                "Competitor Intelligence",
                "Financial Projections",
                "Risk Assessment",
                "Growth Opportunities",
                "SWOT Analysis",
            ],
        ),
        sample(
            "REP-002",
            "Fintech Regulatory Landscape 2025",
            "Fintech",
            (2024, 11, 2),
            "1.1 MB",
            &["Risk Assessment", "Financial Projections"],
        ),
        sample(
            "REP-003",
            "SaaS Churn Analysis & Retention Strategy",
            "SaaS",
            (2024, 9, 28),
            "3.5 MB",
            &["Market Analysis", "Growth Opportunities", "SWOT Analysis"],
        ),
        sample(
            "REP-004",
            "Global Renewable Energy Supply Chain Report",
            "Energy",
            (2024, 12, 5),
            "4.2 MB",
            &["Market Analysis", "Risk Assessment", "Competitor Intelligence"],
        ),
        sample(
            "REP-005",
            "Healthcare AI Adoption Feasibility Study",
            "Healthcare",
            (2024, 8, 10),
            "1.8 MB",
            &["Financial Projections", "SWOT Analysis"],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_catalog_keeps_listing_order() {
        let catalog = MemoryCatalog::seeded();
        let ids: Vec<_> = catalog
            .list_all()
            .into_iter()
            .map(|r| r.id.0)
            .collect();
        assert_eq!(ids, vec!["REP-001", "REP-002", "REP-003", "REP-004", "REP-005"]);
    }

    #[test]
    fn test_get_missing_is_not_found() {
        let catalog = MemoryCatalog::new();
        let err = catalog.get(&ReportId::from("REP-999")).unwrap_err();
        assert_eq!(err, NotFoundError::Report(ReportId::from("REP-999")));
        assert!(catalog.is_empty());
    }
}
