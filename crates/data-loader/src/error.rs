//! Error types for the data-loader crate.
//!
//! Everything that can go wrong while turning a catalog or ratings file into
//! in-memory tables ends up in [`DataLoadError`]. Parse errors always carry the
//! file name and the 1-based line number so a bad row can be found quickly.

use thiserror::Error;

/// Failure raised by the catalog and ratings loaders
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// The path does not exist
    #[error("No such file: {path}")]
    FileNotFound { path: String },

    /// Reading from an opened file failed
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// A row could not be turned into a catalog entry or rating
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: usize,
        reason: String,
    },

    /// A field parsed but is out of range, e.g. a non-positive rating
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// A row had fewer columns than the format requires
    #[error("Expected at least {expected} fields but found {found} in line {line} of {file}")]
    FieldCountMismatch {
        file: String,
        expected: usize,
        found: usize,
        line: usize,
    },
}

/// Result of every loading operation
pub type Result<T> = std::result::Result<T, DataLoadError>;
