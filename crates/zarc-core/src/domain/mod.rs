//! Domain models for Zarc.
//!
//! Canonical definitions for the core entities:
//! - `SelectOption`: A selectable industry or data module
//! - `Report`: A generated market intelligence report
//! - `ReportSection`: One titled block of report content

pub mod error;
pub mod option;
pub mod report;

// Re-export main types and errors
pub use error::{
    DuplicateNameError, ExportError, NotFoundError, Result, ValidationError, ZarcError,
};
pub use option::{OptionKind, SelectOption};
pub use report::{Report, ReportId, ReportSection, ReportStatus};
