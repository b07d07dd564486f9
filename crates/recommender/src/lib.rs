//! # Recommender Crate
//!
//! Neighborhood-based collaborative filtering over explicit ratings:
//! "users who rated like you also liked..."
//!
//! ## Components
//!
//! - **similarity**: squared cosine similarity between two profiles
//! - **neighbors**: users sharing at least one rated item with the target
//! - **candidates**: items neighbors endorse that the target has not rated
//! - **scoring**: similarity-weighted votes, normalized by neighbor breadth
//!   and item popularity
//! - **ranking**: score descending, item id ascending, truncated to `k`
//! - **engine**: `RecommendationEngine` runs the stages in order
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::Dataset;
//! use recommender::{EngineConfig, RecommendationEngine};
//!
//! let dataset = Dataset::load_from_files(movies_path, ratings_path)?;
//! let engine = RecommendationEngine::new(EngineConfig::default())?;
//!
//! let target = [(302156, 4.5)].into_iter().collect();
//! let items = engine.recommend(&target, &dataset.ratings, &dataset.catalog.item_ids(), 10)?;
//! ```

// Public modules
pub mod error;
pub mod config;
pub mod similarity;
pub mod neighbors;
pub mod candidates;
pub mod scoring;
pub mod ranking;
pub mod engine;

// Re-export commonly used types
pub use candidates::{CandidateSet, select_candidates};
pub use config::{DEFAULT_CUTOFF, DEFAULT_SAME_SCORE_WINDOW, EngineConfig};
pub use engine::RecommendationEngine;
pub use error::{EngineError, Result};
pub use neighbors::{NeighborSimilarity, find_neighbors};
pub use ranking::{Recommendation, rank, rank_scored};
pub use scoring::{ItemScores, score_candidates};
pub use similarity::similarity;

#[cfg(test)]
pub(crate) mod test_support {
    use data_loader::{ItemId, RatingProfile, RatingValue, UserRatingTable};
    use std::collections::HashSet;

    pub fn profile(pairs: &[(ItemId, RatingValue)]) -> RatingProfile {
        pairs.iter().copied().collect()
    }

    /// Two users, four items
    pub fn small_table() -> UserRatingTable {
        [
            (1, profile(&[(68735, 3.5), (302156, 4.0)])),
            (2, profile(&[(68735, 1.0), (124057, 1.5), (293660, 4.5)])),
        ]
        .into_iter()
        .collect()
    }

    pub fn catalog_items() -> HashSet<ItemId> {
        [68735, 124057, 293660, 302156].into_iter().collect()
    }
}
