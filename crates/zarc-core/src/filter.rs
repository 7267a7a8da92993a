//! Selection and filter engine.
//!
//! Pure transformations over reference lists and the report catalog:
//! text filtering, selection bookkeeping, grouping, sorting and paging.
//! Nothing here holds state or performs I/O.

use std::collections::HashSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::{Report, SelectOption};

/// Items that carry a stable id.
pub trait Identified {
    fn id(&self) -> &str;
}

/// Items that can be matched by a free-text query.
pub trait Matchable {
    /// Primary display text.
    fn label(&self) -> &str;

    /// Secondary text also searched (e.g. an admin module type).
    fn tag(&self) -> Option<&str> {
        None
    }
}

impl Identified for SelectOption {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for String {
    fn id(&self) -> &str {
        self
    }
}

impl Matchable for SelectOption {
    fn label(&self) -> &str {
        &self.label
    }
}

/// Case-insensitive substring match against label and tag.
pub fn matches_query<T: Matchable>(item: &T, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let needle = query.to_lowercase();
    item.label().to_lowercase().contains(&needle)
        || item
            .tag()
            .map(|t| t.to_lowercase().contains(&needle))
            .unwrap_or(false)
}

/// Keep the items whose label (or tag) contains `query`, in original order.
pub fn filter_by_label<T: Matchable + Clone>(items: &[T], query: &str) -> Vec<T> {
    items
        .iter()
        .filter(|item| matches_query(*item, query))
        .cloned()
        .collect()
}

/// Remove `item` if selected, otherwise append it.
pub fn toggle_selection<T: Identified + Clone>(selected: &[T], item: &T) -> Vec<T> {
    if selected.iter().any(|s| s.id() == item.id()) {
        selected
            .iter()
            .filter(|s| s.id() != item.id())
            .cloned()
            .collect()
    } else {
        let mut next = selected.to_vec();
        next.push(item.clone());
        next
    }
}

/// Union of `selected` and `visible` by id. Existing order first, new items appended.
pub fn select_all_visible<T: Identified + Clone>(selected: &[T], visible: &[T]) -> Vec<T> {
    let mut seen: HashSet<String> = selected.iter().map(|s| s.id().to_string()).collect();
    let mut next = selected.to_vec();
    for item in visible {
        if seen.insert(item.id().to_string()) {
            next.push(item.clone());
        }
    }
    next
}

/// `selected` minus every item whose id appears in `visible`.
pub fn deselect_all_visible<T: Identified + Clone>(selected: &[T], visible: &[T]) -> Vec<T> {
    let hidden: HashSet<&str> = visible.iter().map(|v| v.id()).collect();
    selected
        .iter()
        .filter(|s| !hidden.contains(s.id()))
        .cloned()
        .collect()
}

/// True iff `visible` is non-empty and every visible id is selected.
pub fn are_all_visible_selected<T: Identified>(selected: &[T], visible: &[T]) -> bool {
    if visible.is_empty() {
        return false;
    }
    let chosen: HashSet<&str> = selected.iter().map(|s| s.id()).collect();
    visible.iter().all(|v| chosen.contains(v.id()))
}

/// Report count for one industry label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndustryGroup {
    pub industry: String,
    pub count: usize,
}

/// Tally reports per industry, in first-seen order.
pub fn group_by_industry(reports: &[Report]) -> Vec<IndustryGroup> {
    let mut groups: Vec<IndustryGroup> = Vec::new();
    for report in reports {
        match groups.iter_mut().find(|g| g.industry == report.industry) {
            Some(group) => group.count += 1,
            None => groups.push(IndustryGroup {
                industry: report.industry.clone(),
                count: 1,
            }),
        }
    }
    groups
}

/// `"all"` followed by each distinct industry in first-seen order.
pub fn industry_filter_choices(reports: &[Report]) -> Vec<String> {
    let mut choices = vec![IndustryFilter::ALL.to_string()];
    choices.extend(group_by_industry(reports).into_iter().map(|g| g.industry));
    choices
}

/// Industry restriction for catalog browsing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum IndustryFilter {
    #[default]
    All,
    Only(String),
}

impl IndustryFilter {
    /// Sentinel accepted from front ends to mean "no restriction".
    pub const ALL: &'static str = "all";

    pub fn admits(&self, industry: &str) -> bool {
        match self {
            IndustryFilter::All => true,
            IndustryFilter::Only(wanted) => wanted == industry,
        }
    }
}

impl FromStr for IndustryFilter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == Self::ALL {
            Ok(IndustryFilter::All)
        } else {
            Ok(IndustryFilter::Only(s.to_string()))
        }
    }
}

/// Keep reports whose title contains `query` and whose industry passes `industry`.
pub fn filter_reports(reports: &[Report], query: &str, industry: &IndustryFilter) -> Vec<Report> {
    let needle = query.to_lowercase();
    reports
        .iter()
        .filter(|r| r.title.to_lowercase().contains(&needle) && industry.admits(&r.industry))
        .cloned()
        .collect()
}

/// Catalog ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    /// Newest first.
    #[default]
    Date,
    /// Title ascending.
    Name,
}

impl SortMode {
    pub fn toggled(self) -> Self {
        match self {
            SortMode::Date => SortMode::Name,
            SortMode::Name => SortMode::Date,
        }
    }
}

impl FromStr for SortMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "date" => Ok(SortMode::Date),
            "name" => Ok(SortMode::Name),
            other => Err(format!("unknown sort mode: {other} (expected date or name)")),
        }
    }
}

impl std::fmt::Display for SortMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortMode::Date => write!(f, "date"),
            SortMode::Name => write!(f, "name"),
        }
    }
}

/// Stable sort by `mode`.
pub fn sort_reports(reports: &[Report], mode: SortMode) -> Vec<Report> {
    let mut sorted = reports.to_vec();
    match mode {
        SortMode::Date => sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortMode::Name => sorted.sort_by(|a, b| a.title.cmp(&b.title)),
    }
    sorted
}

/// Slice `[(page-1)*size, page*size)`. Pages are 1-based; out of range yields empty.
pub fn paginate<T: Clone>(items: &[T], page_size: usize, page_number: usize) -> Vec<T> {
    if page_size == 0 || page_number == 0 {
        return Vec::new();
    }
    let start = (page_number - 1).saturating_mul(page_size);
    if start >= items.len() {
        return Vec::new();
    }
    let end = start.saturating_add(page_size).min(items.len());
    items[start..end].to_vec()
}

/// Number of pages needed for `total` items.
pub fn page_count(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}

/// Append `value` (trimmed) unless empty or already present ignoring case.
pub fn add_unique(list: &[String], value: &str) -> Vec<String> {
    bulk_add_unique(list, std::iter::once(value)).0
}

/// Append each trimmed, non-empty value not already present ignoring case.
/// Returns the new list and how many values were added.
pub fn bulk_add_unique<'a, I>(list: &[String], values: I) -> (Vec<String>, usize)
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen: HashSet<String> = list.iter().map(|x| x.to_lowercase()).collect();
    let mut out = list.to_vec();
    let mut added = 0;
    for raw in values {
        let v = raw.trim();
        if v.is_empty() {
            continue;
        }
        if seen.insert(v.to_lowercase()) {
            out.push(v.to_string());
            added += 1;
        }
    }
    (out, added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ReportId, ReportStatus};
    use chrono::{TimeZone, Utc};

    fn opt(id: &str, label: &str) -> SelectOption {
        SelectOption::new(id, label)
    }

    fn sample_options() -> Vec<SelectOption> {
        vec![
            opt("swot", "SWOT Analysis"),
            opt("pestle", "PESTLE Framework"),
            opt("feature_gap", "Feature Gap Analysis"),
            opt("seo_gap", "SEO Keyword Gap"),
        ]
    }

    fn report(id: &str, title: &str, industry: &str, day: u32) -> Report {
        Report {
            id: ReportId::from(id),
            title: title.to_string(),
            industry: industry.to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 10, day, 0, 0, 0).unwrap(),
            file_size: "1.0 MB".to_string(),
            status: ReportStatus::Completed,
            modules: vec![],
            sections: None,
        }
    }

    fn ids(items: &[SelectOption]) -> Vec<&str> {
        items.iter().map(|o| o.id.as_str()).collect()
    }

    #[test]
    fn test_empty_query_returns_items_unchanged() {
        let items = sample_options();
        assert_eq!(filter_by_label(&items, ""), items);
    }

    #[test]
    fn test_filter_is_case_insensitive_and_stable() {
        let items = sample_options();
        let hits = filter_by_label(&items, "gAp");
        assert_eq!(ids(&hits), vec!["feature_gap", "seo_gap"]);
    }

    #[test]
    fn test_filter_excludes_nothing_that_matches() {
        let items = sample_options();
        for query in ["a", "analysis", "x", "SWOT", " "] {
            let hits = filter_by_label(&items, query);
            let expected: Vec<_> = items
                .iter()
                .filter(|o| o.label.to_lowercase().contains(&query.to_lowercase()))
                .cloned()
                .collect();
            assert_eq!(hits, expected, "query {query:?}");
        }
    }

    #[test]
    fn test_toggle_appends_then_removes() {
        let a = opt("a", "A");
        let b = opt("b", "B");
        let c = opt("c", "C");
        let s = vec![a.clone(), b.clone()];

        let added = toggle_selection(&s, &c);
        assert_eq!(ids(&added), vec!["a", "b", "c"]);

        let removed = toggle_selection(&added, &a);
        assert_eq!(ids(&removed), vec!["b", "c"]);
    }

    #[test]
    fn test_toggle_twice_restores_membership() {
        let s = sample_options()[..2].to_vec();
        for x in sample_options() {
            let twice = toggle_selection(&toggle_selection(&s, &x), &x);
            let mut before = ids(&s);
            let mut after = ids(&twice);
            before.sort();
            after.sort();
            assert_eq!(before, after);
        }
    }

    #[test]
    fn test_select_all_visible_dedups_and_appends() {
        let all = sample_options();
        let selected = vec![all[2].clone()];
        let visible = vec![all[0].clone(), all[2].clone(), all[3].clone()];

        let next = select_all_visible(&selected, &visible);
        assert_eq!(ids(&next), vec!["feature_gap", "swot", "seo_gap"]);
        assert!(are_all_visible_selected(&next, &visible));
    }

    #[test]
    fn test_deselect_all_visible_removes_only_visible() {
        let all = sample_options();
        let visible = vec![all[1].clone(), all[3].clone()];

        let next = deselect_all_visible(&all, &visible);
        assert_eq!(ids(&next), vec!["swot", "feature_gap"]);
        assert!(next.iter().all(|s| !visible.contains(s)));
    }

    #[test]
    fn test_all_visible_selected_false_for_empty_visible() {
        let all = sample_options();
        assert!(!are_all_visible_selected(&all, &[]));
        assert!(!are_all_visible_selected(&[], &all));
    }

    #[test]
    fn test_group_by_industry_first_seen_order() {
        let reports = vec![
            report("1", "x", "A", 1),
            report("2", "y", "A", 2),
            report("3", "z", "B", 3),
        ];
        let groups = group_by_industry(&reports);
        assert_eq!(
            groups,
            vec![
                IndustryGroup {
                    industry: "A".into(),
                    count: 2
                },
                IndustryGroup {
                    industry: "B".into(),
                    count: 1
                },
            ]
        );
        assert_eq!(industry_filter_choices(&reports), vec!["all", "A", "B"]);
    }

    #[test]
    fn test_filter_reports_by_title_and_industry() {
        let reports = vec![
            report("1", "Fintech Regulatory Landscape", "Fintech", 1),
            report("2", "SaaS Churn Analysis", "SaaS", 2),
            report("3", "Fintech Payments Analysis", "Fintech Payments", 3),
        ];

        let all: IndustryFilter = "all".parse().unwrap();
        let hits = filter_reports(&reports, "FINTECH", &all);
        assert_eq!(hits.len(), 2);

        let only: IndustryFilter = "Fintech".parse().unwrap();
        let hits = filter_reports(&reports, "fintech", &only);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id.as_str(), "1");

        let hits = filter_reports(&reports, "", &IndustryFilter::All);
        assert_eq!(hits.len(), 3);
    }

    #[test]
    fn test_sort_by_date_newest_first() {
        let reports = vec![
            report("old", "b", "A", 1),
            report("new", "a", "A", 20),
            report("mid", "c", "A", 10),
        ];
        let sorted = sort_reports(&reports, SortMode::Date);
        let order: Vec<_> = sorted.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(order, vec!["new", "mid", "old"]);
    }

    #[test]
    fn test_sort_by_name_ascending() {
        let reports = vec![
            report("1", "Gamma", "A", 1),
            report("2", "Alpha", "A", 2),
            report("3", "Beta", "A", 3),
        ];
        let sorted = sort_reports(&reports, SortMode::Name);
        let titles: Vec<_> = sorted.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Alpha", "Beta", "Gamma"]);
    }

    #[test]
    fn test_sort_is_stable_for_equal_dates() {
        let reports = vec![
            report("first", "z", "A", 5),
            report("second", "a", "A", 5),
            report("newer", "m", "A", 9),
        ];
        let sorted = sort_reports(&reports, SortMode::Date);
        let order: Vec<_> = sorted.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(order, vec!["newer", "first", "second"]);
    }

    #[test]
    fn test_sort_mode_parse_and_toggle() {
        assert_eq!("date".parse::<SortMode>().unwrap(), SortMode::Date);
        assert_eq!("name".parse::<SortMode>().unwrap(), SortMode::Name);
        assert!("size".parse::<SortMode>().is_err());
        assert_eq!(SortMode::Date.toggled(), SortMode::Name);
    }

    #[test]
    fn test_paginate_boundaries() {
        let items: Vec<u32> = (1..=37).collect();
        assert_eq!(paginate(&items, 15, 1), (1..=15).collect::<Vec<_>>());
        assert_eq!(paginate(&items, 15, 3), (31..=37).collect::<Vec<_>>());
        assert!(paginate(&items, 15, 4).is_empty());
        assert!(paginate(&items, 15, 0).is_empty());
        assert!(paginate(&items, 0, 1).is_empty());
        assert_eq!(page_count(items.len(), 15), 3);
        assert_eq!(page_count(0, 15), 0);
    }

    #[test]
    fn test_add_unique_ignores_case_and_blanks() {
        let list = vec!["pricing".to_string()];
        assert_eq!(add_unique(&list, "  Pricing "), list);
        assert_eq!(add_unique(&list, "   "), list);
        assert_eq!(add_unique(&list, " reviews "), vec!["pricing", "reviews"]);
    }

    #[test]
    fn test_bulk_add_unique_counts_new_values() {
        let list = vec!["a".to_string()];
        let (next, added) = bulk_add_unique(&list, ["A", "b", "B", "", "c"]);
        assert_eq!(next, vec!["a", "b", "c"]);
        assert_eq!(added, 2);
    }
}
