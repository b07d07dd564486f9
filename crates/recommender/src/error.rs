//! Error types for the recommender crate.

use data_loader::{ItemId, UserId};
use thiserror::Error;

/// Errors returned by the recommendation engine
///
/// Empty results are not errors: a target with no neighbors or no candidates
/// simply gets an empty recommendation list.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// A user id was referenced (by the index or by the caller) but has no
    /// profile in the rating table
    #[error("Unknown user: {0}")]
    UnknownUser(UserId),

    /// A caller-supplied index was built from an older version of the table
    #[error("Item-user index is stale: built at generation {index}, table is at {table}")]
    StaleIndex { index: u64, table: u64 },

    /// The index and table disagree in a way that cannot happen when the
    /// index was built from the table
    #[error("Invariant violated for item {item}: {reason}")]
    InvariantViolation { item: ItemId, reason: String },

    /// An engine setting is out of range
    #[error("Invalid value for {field}: {value}")]
    InvalidConfig { field: String, value: String },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, EngineError>;
