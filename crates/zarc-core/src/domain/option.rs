//! Selectable reference items (industries and data modules).

use serde::{Deserialize, Serialize};

/// Which reference list an option belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionKind {
    Industry,
    Module,
}

impl std::fmt::Display for OptionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OptionKind::Industry => write!(f, "industry"),
            OptionKind::Module => write!(f, "module"),
        }
    }
}

/// A selectable reference item.
///
/// Icons are a presentation concern and are not carried here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SelectOption {
    /// Stable identifier, unique within its reference list.
    pub id: String,
    /// Display name.
    pub label: String,
    /// Grouping tag (modules only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl SelectOption {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            category: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}
