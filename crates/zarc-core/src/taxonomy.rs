//! Taxonomy admin: the industries and modules that back report generation.
//!
//! Admin industries carry the crawl inputs (keywords, source URLs, CSS
//! selectors) and the module ids bundled with them. Edits go through an
//! [`IndustryDraft`] which is validated as a whole on save.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::{
    DuplicateNameError, NotFoundError, OptionKind, ValidationError, ZarcError,
};
use crate::filter::{self, Identified, Matchable};
use crate::metrics::METRICS;
use crate::obs;

/// A data module that can be bundled into an industry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminModule {
    pub id: String,
    pub name: String,
    /// Core, AI, Analytics or a custom label.
    pub kind: String,
    pub description: String,
}

impl Identified for AdminModule {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Matchable for AdminModule {
    fn label(&self) -> &str {
        &self.name
    }

    fn tag(&self) -> Option<&str> {
        Some(&self.kind)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminIndustry {
    pub id: String,
    pub name: String,
    /// Module ids.
    pub modules: Vec<String>,
    pub keywords: Vec<String>,
    pub urls: Vec<String>,
    pub selectors: Vec<String>,
}

impl Matchable for AdminIndustry {
    fn label(&self) -> &str {
        &self.name
    }
}

/// Split a pasted block on newlines and commas.
pub fn split_bulk(text: &str) -> Vec<&str> {
    text.split(['\n', ','])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Form state for creating or editing an industry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndustryDraft {
    pub name: String,
    pub modules: Vec<String>,
    pub keywords: Vec<String>,
    pub urls: Vec<String>,
    pub selectors: Vec<String>,
    /// Id of the industry being edited, `None` when creating.
    pub editing: Option<String>,
}

impl IndustryDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    fn from_industry(industry: &AdminIndustry) -> Self {
        Self {
            name: industry.name.clone(),
            modules: industry.modules.clone(),
            keywords: industry.keywords.clone(),
            urls: industry.urls.clone(),
            selectors: industry.selectors.clone(),
            editing: Some(industry.id.clone()),
        }
    }

    /// Returns whether the keyword was new.
    pub fn add_keyword(&mut self, value: &str) -> bool {
        add_into(&mut self.keywords, std::iter::once(value)) > 0
    }

    pub fn add_url(&mut self, value: &str) -> bool {
        add_into(&mut self.urls, std::iter::once(value)) > 0
    }

    pub fn add_selector(&mut self, value: &str) -> bool {
        add_into(&mut self.selectors, std::iter::once(value)) > 0
    }

    /// Add every keyword in a pasted block. Returns how many were new.
    pub fn bulk_add_keywords(&mut self, text: &str) -> usize {
        add_into(&mut self.keywords, split_bulk(text))
    }

    pub fn bulk_add_urls(&mut self, text: &str) -> usize {
        add_into(&mut self.urls, split_bulk(text))
    }

    pub fn bulk_add_selectors(&mut self, text: &str) -> usize {
        add_into(&mut self.selectors, split_bulk(text))
    }

    pub fn toggle_module(&mut self, module_id: &str) {
        self.modules = filter::toggle_selection(&self.modules, &module_id.to_string());
    }

    /// Select-all / unselect-all over the currently visible modules.
    pub fn toggle_visible_modules(&mut self, visible: &[AdminModule]) {
        if visible.is_empty() {
            return;
        }
        let ids: Vec<String> = visible.iter().map(|m| m.id.clone()).collect();
        self.modules = if filter::are_all_visible_selected(&self.modules, &ids) {
            filter::deselect_all_visible(&self.modules, &ids)
        } else {
            filter::select_all_visible(&self.modules, &ids)
        };
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName {
                kind: OptionKind::Industry,
            });
        }
        if self.keywords.is_empty() {
            return Err(ValidationError::MissingKeywords);
        }
        if self.modules.is_empty() {
            return Err(ValidationError::NoModulesSelected);
        }
        Ok(())
    }
}

fn add_into<'a>(list: &mut Vec<String>, values: impl IntoIterator<Item = &'a str>) -> usize {
    let (next, added) = filter::bulk_add_unique(list, values);
    *list = next;
    added
}

/// One page of an industry search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndustryPage {
    pub items: Vec<AdminIndustry>,
    /// Matches across all pages.
    pub total: usize,
    pub page: usize,
    pub page_count: usize,
}

impl IndustryPage {
    /// 1-based range of the shown items, `(0, 0)` when empty.
    pub fn showing(&self, page_size: usize) -> (usize, usize) {
        if self.items.is_empty() {
            return (0, 0);
        }
        let first = (self.page - 1) * page_size + 1;
        (first, first + self.items.len() - 1)
    }
}

/// In-process registry of admin industries and modules.
#[derive(Debug, Clone)]
pub struct TaxonomyRegistry {
    industries: Vec<AdminIndustry>,
    modules: Vec<AdminModule>,
    synthesis_delay: Duration,
    created: u64,
}

impl TaxonomyRegistry {
    pub fn new(
        industries: Vec<AdminIndustry>,
        modules: Vec<AdminModule>,
        synthesis_delay: Duration,
    ) -> Self {
        Self {
            industries,
            modules,
            synthesis_delay,
            created: 0,
        }
    }

    /// 50 industries and 100 modules of generated sample data.
    pub fn sample(synthesis_delay: Duration) -> Self {
        const KINDS: [&str; 3] = ["Core", "AI", "Analytics"];

        let industries = (0..50)
            .map(|i| AdminIndustry {
                id: format!("ind-{i}"),
                name: format!("Industry Sector {}", i + 1),
                modules: vec![format!("mod-{i}"), format!("mod-{}", i + 1)],
                keywords: vec![format!("keyword{}", i + 1)],
                urls: if i % 5 == 0 {
                    vec![format!("https://example.com/industry/{i}")]
                } else {
                    Vec::new()
                },
                selectors: if i % 7 == 0 {
                    vec![".title".to_string(), ".price".to_string()]
                } else {
                    Vec::new()
                },
            })
            .collect();
        let modules = (0..100)
            .map(|i| AdminModule {
                id: format!("mod-{i}"),
                name: format!("Module Feature {}", i + 1),
                kind: KINDS[i % 3].to_string(),
                description: "Automated data extraction and processing unit.".to_string(),
            })
            .collect();
        Self::new(industries, modules, synthesis_delay)
    }

    pub fn industries(&self) -> &[AdminIndustry] {
        &self.industries
    }

    pub fn modules(&self) -> &[AdminModule] {
        &self.modules
    }

    pub fn industry(&self, id: &str) -> Result<&AdminIndustry, NotFoundError> {
        self.industries
            .iter()
            .find(|i| i.id == id)
            .ok_or_else(|| NotFoundError::Industry(id.to_string()))
    }

    /// Industries whose name contains `query`, paginated.
    pub fn search_industries(&self, query: &str, page: usize, page_size: usize) -> IndustryPage {
        let matches = filter::filter_by_label(&self.industries, query);
        IndustryPage {
            items: filter::paginate(&matches, page_size, page),
            total: matches.len(),
            page,
            page_count: filter::page_count(matches.len(), page_size),
        }
    }

    /// Modules whose name or kind contains `query`.
    pub fn search_modules(&self, query: &str) -> Vec<AdminModule> {
        filter::filter_by_label(&self.modules, query)
    }

    /// Load an industry into a draft for editing.
    pub fn edit(&self, id: &str) -> Result<IndustryDraft, NotFoundError> {
        self.industry(id).map(IndustryDraft::from_industry)
    }

    /// Validate and store `draft`.
    ///
    /// New industries go to the front of the list; edits replace in place.
    pub fn save(&mut self, draft: IndustryDraft) -> Result<AdminIndustry, ZarcError> {
        self.check_draft(&draft).inspect_err(|e| {
            METRICS.inc_validation_rejections();
            obs::emit_taxonomy_rejected("save", e);
        })?;

        let name = draft.name.trim().to_string();
        match draft.editing {
            Some(id) => {
                let slot = self
                    .industries
                    .iter_mut()
                    .find(|i| i.id == id)
                    .ok_or(NotFoundError::Industry(id))?;
                slot.name = name;
                slot.modules = draft.modules;
                slot.keywords = draft.keywords;
                slot.urls = draft.urls;
                slot.selectors = draft.selectors;
                Ok(slot.clone())
            }
            None => {
                let industry = AdminIndustry {
                    id: self.next_id(),
                    name,
                    modules: draft.modules,
                    keywords: draft.keywords,
                    urls: draft.urls,
                    selectors: draft.selectors,
                };
                self.industries.insert(0, industry.clone());
                Ok(industry)
            }
        }
    }

    pub fn delete(&mut self, id: &str) -> Result<AdminIndustry, NotFoundError> {
        let index = self
            .industries
            .iter()
            .position(|i| i.id == id)
            .ok_or_else(|| NotFoundError::Industry(id.to_string()))?;
        Ok(self.industries.remove(index))
    }

    /// Kick off analysis for an industry. Resolves after the synthesis delay
    /// with the industry name.
    pub async fn request_report(&self, industry_id: &str) -> Result<String, ZarcError> {
        let industry = self.industry(industry_id)?;
        if industry.keywords.is_empty() {
            let err = ValidationError::MissingKeywords;
            METRICS.inc_validation_rejections();
            obs::emit_taxonomy_rejected("request_report", &err);
            return Err(err.into());
        }
        let name = industry.name.clone();
        tokio::time::sleep(self.synthesis_delay).await;
        Ok(name)
    }

    fn check_draft(&self, draft: &IndustryDraft) -> Result<(), ZarcError> {
        draft.validate()?;
        let wanted = draft.name.trim().to_lowercase();
        let taken = self.industries.iter().any(|i| {
            i.name.to_lowercase() == wanted && Some(&i.id) != draft.editing.as_ref()
        });
        if taken {
            return Err(DuplicateNameError {
                kind: OptionKind::Industry,
                name: draft.name.trim().to_string(),
            }
            .into());
        }
        Ok(())
    }

    fn next_id(&mut self) -> String {
        loop {
            self.created += 1;
            let id = format!("ind-new-{}", self.created);
            if !self.industries.iter().any(|i| i.id == id) {
                return id;
            }
        }
    }
}
