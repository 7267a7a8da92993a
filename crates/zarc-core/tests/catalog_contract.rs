//! Contract tests for ReportCatalog.
//!
//! Any conforming implementation must pass these; they run against the
//! in-memory catalog.

use std::sync::Arc;

use chrono::Utc;
use zarc_core::{MemoryCatalog, NotFoundError, Report, ReportCatalog, ReportId, ReportStatus};

fn report(id: &str, industry: &str) -> Report {
    Report {
        id: ReportId::from(id),
        title: Report::title_for(industry),
        industry: industry.to_string(),
        created_at: Utc::now(),
        file_size: "1.0 MB".to_string(),
        status: ReportStatus::Completed,
        modules: vec!["SWOT Analysis".to_string()],
        sections: None,
    }
}

fn ids(catalog: &dyn ReportCatalog) -> Vec<String> {
    catalog.list_all().into_iter().map(|r| r.id.0).collect()
}

#[test]
fn add_prepends_and_preserves_prior_entries() {
    let catalog = MemoryCatalog::seeded();
    let before = ids(&catalog);

    catalog.add(report("REP-NEW", "Agritech"));

    let after = ids(&catalog);
    assert_eq!(after[0], "REP-NEW");
    assert_eq!(&after[1..], before.as_slice());
    assert_eq!(catalog.len(), 6);
}

#[test]
fn list_all_is_newest_first() {
    let catalog = MemoryCatalog::new();
    catalog.add(report("REP-A", "Solar Energy"));
    catalog.add(report("REP-B", "Solar Energy"));
    catalog.add(report("REP-C", "Biotechnology"));
    assert_eq!(ids(&catalog), vec!["REP-C", "REP-B", "REP-A"]);
}

#[test]
fn list_all_returns_a_snapshot() {
    let catalog = MemoryCatalog::new();
    catalog.add(report("REP-A", "Solar Energy"));
    let snapshot = catalog.list_all();
    catalog.add(report("REP-B", "Solar Energy"));
    assert_eq!(snapshot.len(), 1);
    assert_eq!(catalog.len(), 2);
}

#[test]
fn get_and_contains() {
    let catalog = MemoryCatalog::seeded();
    let found = catalog.get(&ReportId::from("REP-004")).unwrap();
    assert_eq!(found.industry, "Energy");
    assert!(catalog.contains(&ReportId::from("REP-001")));
    assert!(!catalog.contains(&ReportId::from("REP-404")));
    assert!(matches!(
        catalog.get(&ReportId::from("REP-404")),
        Err(NotFoundError::Report(_))
    ));
}

#[tokio::test]
async fn concurrent_adds_are_all_kept() {
    let catalog: Arc<dyn ReportCatalog> = Arc::new(MemoryCatalog::new());
    let mut handles = Vec::new();
    for i in 0..16 {
        let catalog = Arc::clone(&catalog);
        handles.push(tokio::spawn(async move {
            catalog.add(report(&format!("REP-{i:03}"), "Cybersecurity"));
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }
    assert_eq!(catalog.len(), 16);
}
