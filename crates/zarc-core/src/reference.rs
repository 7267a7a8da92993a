//! Reference lists of industries and data modules offered by the wizard.

use serde::{Deserialize, Serialize};

use crate::domain::{DuplicateNameError, OptionKind, SelectOption, ValidationError, ZarcError};

const BUILTIN_INDUSTRIES: &[(&str, &str)] = &[
    ("solar", "Solar Energy"),
    ("fintech", "Fintech Payments"),
    ("saas_b2b", "B2B SaaS"),
    ("ecommerce_fashion", "E-commerce (Fashion)"),
    ("biotech", "Biotechnology"),
    ("real_estate", "Commercial Real Estate"),
    ("cybersec", "Cybersecurity"),
    ("agritech", "Agritech"),
    ("gaming", "Gaming & Esports"),
];

const BUILTIN_MODULES: &[(&str, &str, &str)] = &[
    ("tam_sam_som", "Market Size (TAM/SAM/SOM)", "Market"),
    ("growth_forecast", "5-Year Growth Forecast", "Market"),
    ("swot", "SWOT Analysis", "Strategy"),
    ("pestle", "PESTLE Framework", "Strategy"),
    ("competitor_pricing", "Competitor Pricing Matrix", "Competitor"),
    ("feature_gap", "Feature Gap Analysis", "Competitor"),
    ("market_share", "Market Share Breakdown", "Competitor"),
    ("customer_persona", "Customer Personas", "Consumer"),
    ("sentiment_analysis", "Brand Sentiment Analysis", "Consumer"),
    ("ma_activity", "Recent M&A Activity", "Finance"),
    ("funding_trends", "VC Funding Trends", "Finance"),
    ("seo_gap", "SEO Keyword Gap", "Digital"),
    ("tech_stack", "Technology Stack Intel", "Tech"),
    ("app_ratings", "Mobile App Performance", "Digital"),
    ("regulatory", "Regulatory Landscape", "Legal"),
    ("supply_chain", "Supply Chain Risks", "Ops"),
    ("patent_landscape", "Patent & IP Landscape", "R&D"),
];

/// The industry and module lists the wizard selects from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceData {
    industries: Vec<SelectOption>,
    modules: Vec<SelectOption>,
}

impl Default for ReferenceData {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ReferenceData {
    /// The product's stock industries and modules.
    pub fn builtin() -> Self {
        Self {
            industries: BUILTIN_INDUSTRIES
                .iter()
                .map(|(id, label)| SelectOption::new(*id, *label))
                .collect(),
            modules: BUILTIN_MODULES
                .iter()
                .map(|(id, label, category)| SelectOption::new(*id, *label).with_category(*category))
                .collect(),
        }
    }

    pub fn new(industries: Vec<SelectOption>, modules: Vec<SelectOption>) -> Self {
        Self {
            industries,
            modules,
        }
    }

    pub fn industries(&self) -> &[SelectOption] {
        &self.industries
    }

    pub fn modules(&self) -> &[SelectOption] {
        &self.modules
    }

    pub fn list(&self, kind: OptionKind) -> &[SelectOption] {
        match kind {
            OptionKind::Industry => &self.industries,
            OptionKind::Module => &self.modules,
        }
    }

    pub fn industry(&self, id: &str) -> Option<&SelectOption> {
        self.industries.iter().find(|o| o.id == id)
    }

    pub fn module(&self, id: &str) -> Option<&SelectOption> {
        self.modules.iter().find(|o| o.id == id)
    }

    /// Add an industry. Rejects blank and case-insensitively duplicate labels.
    pub fn add_industry(&mut self, label: &str) -> Result<SelectOption, ZarcError> {
        let option = self.prepare(OptionKind::Industry, label)?;
        self.industries.push(option.clone());
        Ok(option)
    }

    /// Add a module under `category`. Same rules as [`Self::add_industry`].
    pub fn add_module(&mut self, label: &str, category: &str) -> Result<SelectOption, ZarcError> {
        let option = self
            .prepare(OptionKind::Module, label)?
            .with_category(category.trim());
        self.modules.push(option.clone());
        Ok(option)
    }

    fn prepare(&self, kind: OptionKind, label: &str) -> Result<SelectOption, ZarcError> {
        let label = label.trim();
        if label.is_empty() {
            return Err(ValidationError::EmptyName { kind }.into());
        }

        let list = self.list(kind);
        let wanted = label.to_lowercase();
        if list.iter().any(|o| o.label.to_lowercase() == wanted) {
            return Err(DuplicateNameError {
                kind,
                name: label.to_string(),
            }
            .into());
        }

        let base = slugify(label);
        let mut id = base.clone();
        let mut n = 2;
        while list.iter().any(|o| o.id == id) {
            id = format!("{base}_{n}");
            n += 1;
        }
        Ok(SelectOption::new(id, label))
    }
}

/// Lowercase, alphanumerics kept, everything else folded into single `_`.
fn slugify(label: &str) -> String {
    let mut slug = String::with_capacity(label.len());
    for c in label.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('_') && !slug.is_empty() {
            slug.push('_');
        }
    }
    let trimmed = slug.trim_end_matches('_');
    if trimmed.is_empty() {
        "option".to_string()
    } else {
        trimmed.to_string()
    }
}
