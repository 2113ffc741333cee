//! Error types for tagsplit.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// A rejected user edit. Nothing is mutated when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Rule name is empty after trimming.
    #[error("Rule name must not be empty")]
    EmptyName,

    /// Another rule already uses this name.
    #[error("A rule named '{0}' already exists")]
    DuplicateName(String),

    /// No rule with this name.
    #[error("Rule not found: {0}")]
    UnknownRule(String),

    /// A rule draft lists a tag the rule does not own.
    #[error("Tag '{tag}' is not owned by rule '{rule}'")]
    ForeignTag { rule: String, tag: String },

    /// The tag is not in a pool it could be taken from.
    #[error("Tag '{0}' is not available")]
    TagNotAvailable(String),

    /// An assignment was requested with no tag selected.
    #[error("No tag selected")]
    NoTagSelected,

    /// The command needs a loaded workbook.
    #[error("No workbook loaded")]
    NoWorkbook,

    /// The command needs a selected source column.
    #[error("No source column selected")]
    NoColumnSelected,

    /// The first sheet has no columns to choose from.
    #[error("The first sheet has no columns")]
    NoColumns,

    /// Column letter outside the first sheet's used columns.
    #[error("Invalid column '{letter}': expected one of A..{last}")]
    InvalidColumn { letter: String, last: String },
}

/// The persisted configuration could not be read or written.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// I/O error on the configuration file.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not a valid record.
    #[error("Corrupt configuration {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The loaded record breaks the one-owner-per-tag invariant.
    #[error("Inconsistent configuration {path}: tag '{tag}' has more than one owner")]
    Conflict { path: PathBuf, tag: String },
}

impl PersistenceError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Any error surfaced by the core.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Rejected edit.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Configuration storage error.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// Workbook read/write error.
    #[error("Workbook error: {0}")]
    Sheet(#[from] tagsplit_sheet::SheetError),
}
