//! # Data Loader Crate
//!
//! This crate loads rating data and builds the in-memory tables the
//! recommender works on.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (RatingProfile, UserRatingTable, Catalog, ItemUserIndex)
//! - **parser**: Parse the comma-separated catalog and ratings files
//! - **index**: Build the item -> users index and sanitize tables
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::{Dataset, ItemUserIndex};
//! use std::path::Path;
//!
//! let dataset = Dataset::load_from_files(
//!     Path::new("data/movies_small.csv"),
//!     Path::new("data/ratings_small.csv"),
//! )?;
//!
//! let index = ItemUserIndex::build(&dataset.ratings);
//! println!("{} users rated item 68735", index.popularity(68735));
//! ```

// Public modules
pub mod error;
pub mod types;
pub mod parser;
pub mod index;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, Result};
pub use index::{invert, sanitize};
pub use types::{
    // Type aliases
    UserId,
    ItemId,
    RatingValue,
    RatingProfile,
    // Core types
    UserRatingTable,
    Catalog,
    CatalogEntry,
    ItemUserIndex,
    Dataset,
    SanitizeReport,
};
