//! Error types for the tag-and-probe skim.

use thiserror::Error;

/// Errors that can occur while building or running a skim.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid input data (bad column shapes, non-finite values, ...).
    #[error("validation error: {0}")]
    Validation(String),

    /// Named column not present in the event table.
    #[error("column not found: {0}")]
    ColumnNotFound(String),

    /// Column exists but holds a different element type.
    #[error("column type mismatch: {0}")]
    ColumnType(String),

    /// Co-indexed columns disagree on length.
    #[error("length mismatch for column '{name}': expected {expected}, got {got}")]
    LengthMismatch {
        /// Offending column name.
        name: String,
        /// Length implied by the other columns.
        expected: usize,
        /// Actual length.
        got: usize,
    },

    /// Expression parse or evaluation error.
    #[error("expression error: {0}")]
    Expression(String),

    /// Invalid selection configuration.
    #[error("config error: {0}")]
    Config(String),
}

/// Result alias for skim operations.
pub type Result<T> = std::result::Result<T, Error>;
