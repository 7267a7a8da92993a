//! Section-by-section report viewer.

use serde::Serialize;

use crate::catalog::ReportCatalog;
use crate::domain::{NotFoundError, Report, ReportId, ReportSection};
use crate::export::{self, ExportDocument, EXECUTIVE_SUMMARY};
use crate::filter::{self, Identified, Matchable};

/// Nav id of the leading summary item.
pub const SUMMARY_ID: &str = "summary";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavItem {
    pub id: String,
    pub label: String,
    /// "Overview" for the summary, "Modules" otherwise.
    pub category: &'static str,
}

impl Identified for NavItem {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Matchable for NavItem {
    fn label(&self) -> &str {
        &self.label
    }
}

/// Read-only view over one catalog report.
#[derive(Debug, Clone)]
pub struct ReportViewer {
    report: Report,
    items: Vec<NavItem>,
    sections: Vec<ReportSection>,
    active: usize,
    search: String,
}

impl ReportViewer {
    pub fn open(catalog: &dyn ReportCatalog, id: &ReportId) -> Result<Self, NotFoundError> {
        Ok(Self::new(catalog.get(id)?))
    }

    pub fn new(report: Report) -> Self {
        let mut items = vec![NavItem {
            id: SUMMARY_ID.to_string(),
            label: EXECUTIVE_SUMMARY.to_string(),
            category: "Overview",
        }];
        items.extend(report.modules.iter().map(|m| NavItem {
            id: m.clone(),
            label: m.clone(),
            category: "Modules",
        }));
        let sections = export::build_export_sections(&report);
        Self {
            report,
            items,
            sections,
            active: 0,
            search: String::new(),
        }
    }

    pub fn report(&self) -> &Report {
        &self.report
    }

    /// Every nav item, ignoring the sidebar search.
    pub fn nav_items(&self) -> &[NavItem] {
        &self.items
    }

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.search = query.into();
    }

    /// Nav items matching the sidebar search.
    pub fn visible_items(&self) -> Vec<NavItem> {
        filter::filter_by_label(&self.items, &self.search)
    }

    pub fn active_item(&self) -> &NavItem {
        &self.items[self.active]
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn has_next(&self) -> bool {
        self.active + 1 < self.items.len()
    }

    pub fn has_prev(&self) -> bool {
        self.active > 0
    }

    /// Advance one item. Stays put on the last item.
    pub fn next(&mut self) -> &NavItem {
        if self.has_next() {
            self.active += 1;
        }
        self.active_item()
    }

    /// Go back one item. Stays put on the first item.
    pub fn prev(&mut self) -> &NavItem {
        if self.has_prev() {
            self.active -= 1;
        }
        self.active_item()
    }

    /// Jump to the item with `id`.
    pub fn select(&mut self, id: &str) -> Result<&NavItem, NotFoundError> {
        let index = self
            .items
            .iter()
            .position(|item| item.id == id)
            .ok_or_else(|| NotFoundError::Section(id.to_string()))?;
        self.active = index;
        Ok(self.active_item())
    }

    /// Resolved content for the current item.
    pub fn active_section(&self) -> Option<&ReportSection> {
        let label = &self.active_item().label;
        self.sections.iter().find(|s| &s.title == label)
    }

    /// The current item alone, ready for a renderer.
    pub fn active_document(&self) -> Result<ExportDocument, NotFoundError> {
        ExportDocument::from_report(&self.report).only_section(&self.active_item().label)
    }

    /// Download name for the current item.
    pub fn export_filename(&self, extension: &str) -> String {
        export::export_filename(&self.report.title, Some(&self.active_item().label), extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MemoryCatalog;

    fn viewer() -> ReportViewer {
        ReportViewer::open(&MemoryCatalog::seeded(), &ReportId::from("REP-003")).unwrap()
    }

    #[test]
    fn test_nav_starts_with_summary() {
        let v = viewer();
        let ids: Vec<_> = v.nav_items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![SUMMARY_ID, "Market Analysis", "Growth Opportunities", "SWOT Analysis"]
        );
        assert_eq!(v.active_item().label, EXECUTIVE_SUMMARY);
        assert_eq!(v.active_section().unwrap().title, EXECUTIVE_SUMMARY);
    }

    #[test]
    fn test_next_and_prev_clamp() {
        let mut v = viewer();
        assert_eq!(v.prev().id, SUMMARY_ID);
        for _ in 0..10 {
            v.next();
        }
        assert_eq!(v.active_item().id, "SWOT Analysis");
        assert!(!v.has_next());
        assert_eq!(v.prev().id, "Growth Opportunities");
    }

    #[test]
    fn test_sidebar_search_does_not_move_selection() {
        let mut v = viewer();
        v.set_search("ANALYSIS");
        let labels: Vec<_> = v.visible_items().into_iter().map(|i| i.label).collect();
        assert_eq!(labels, vec!["Market Analysis", "SWOT Analysis"]);
        assert_eq!(v.active_item().id, SUMMARY_ID);
        v.next();
        assert_eq!(v.active_item().id, "Market Analysis");
    }

    #[test]
    fn test_select_unknown_section() {
        let mut v = viewer();
        assert_eq!(
            v.select("Pricing").unwrap_err(),
            NotFoundError::Section("Pricing".to_string())
        );
        v.select("SWOT Analysis").unwrap();
        assert_eq!(v.active_section().unwrap().title, "SWOT Analysis");
        assert_eq!(v.active_document().unwrap().sections.len(), 1);
    }

    #[test]
    fn test_export_filename_includes_section() {
        let mut v = viewer();
        v.select("SWOT Analysis").unwrap();
        assert_eq!(
            v.export_filename("md"),
            "SaaS_Churn_Analysis_Retention_Strategy_SWOT_Analysis.md"
        );
    }

    #[test]
    fn test_open_missing_report() {
        let err = ReportViewer::open(&MemoryCatalog::new(), &ReportId::from("REP-404")).unwrap_err();
        assert_eq!(err, NotFoundError::Report(ReportId::from("REP-404")));
    }
}
