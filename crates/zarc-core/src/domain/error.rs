//! Domain-level error taxonomy for Zarc.

use std::path::PathBuf;

use super::option::OptionKind;
use super::report::ReportId;

/// Unmet preconditions for a user action.
///
/// Front ends are expected to prevent these by disabling the control; the
/// core still reports them so the guard is testable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("select an industry before continuing")]
    NoIndustrySelected,

    #[error("select at least 1 module")]
    NoModulesSelected,

    #[error("{kind} name is required")]
    EmptyName { kind: OptionKind },

    #[error("at least 1 keyword is required")]
    MissingKeywords,

    #[error("unknown {kind}: {id}")]
    UnknownOption { kind: OptionKind, id: String },

    #[error("action not available while {step}")]
    WrongStep { step: String },
}

/// A reference entity with the same name (case-insensitive) already exists.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} name already exists: {name}")]
pub struct DuplicateNameError {
    pub kind: OptionKind,
    pub name: String,
}

/// Lookup by id failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotFoundError {
    #[error("report not found: {0}")]
    Report(ReportId),

    #[error("industry not found: {0}")]
    Industry(String),

    #[error("section not found: {0}")]
    Section(String),
}

/// Errors produced while exporting a report document.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    #[error("document rendering failed: {0}")]
    Render(String),

    #[error("failed to save {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Zarc domain errors.
#[derive(Debug, thiserror::Error)]
pub enum ZarcError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    DuplicateName(#[from] DuplicateNameError),

    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    #[error("export failed: {0}")]
    Export(#[from] ExportError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for Zarc domain operations.
pub type Result<T> = std::result::Result<T, ZarcError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_name_display() {
        let err = DuplicateNameError {
            kind: OptionKind::Industry,
            name: "Biotechnology".to_string(),
        };
        assert_eq!(err.to_string(), "industry name already exists: Biotechnology");
    }

    #[test]
    fn test_not_found_is_distinct_from_render_failure() {
        let err: ExportError = NotFoundError::Report(ReportId::from("REP-404")).into();
        assert!(matches!(err, ExportError::NotFound(_)));
        assert!(err.to_string().contains("REP-404"));

        let err = ExportError::Render("packer crashed".to_string());
        assert!(err.to_string().contains("rendering failed"));
    }

    #[test]
    fn test_io_error_mentions_path() {
        let err = ExportError::Io {
            path: PathBuf::from("/tmp/out/report.md"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/tmp/out/report.md"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn test_zarc_error_wraps_validation() {
        let err: ZarcError = ValidationError::NoModulesSelected.into();
        assert!(err.to_string().contains("validation error"));
    }
}
