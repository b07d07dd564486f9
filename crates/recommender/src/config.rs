//! Engine configuration.
//!
//! The endorsement cutoff and the ranking window used to be fixed constants;
//! they are plain values here so callers and tests can vary them.

use crate::error::{EngineError, Result};
use data_loader::RatingValue;

/// Minimum rating counted as a positive endorsement
pub const DEFAULT_CUTOFF: RatingValue = 3.5;

/// Extra entries kept past `k` before the exact tie-break sort
pub const DEFAULT_SAME_SCORE_WINDOW: usize = 10;

/// Settings for [`crate::RecommendationEngine`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Ratings at or above this value count as endorsements
    pub cutoff: RatingValue,
    /// How many score-tied entries past `k` the ranker keeps (see [`crate::ranking`])
    pub same_score_window: usize,
    /// Score candidates on the rayon thread pool
    pub parallel_scoring: bool,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the endorsement cutoff (default: 3.5)
    pub fn with_cutoff(mut self, cutoff: RatingValue) -> Self {
        self.cutoff = cutoff;
        self
    }

    /// Configure the ranking window (default: 10)
    pub fn with_same_score_window(mut self, window: usize) -> Self {
        self.same_score_window = window;
        self
    }

    /// Turn parallel scoring on or off (default: on)
    pub fn with_parallel_scoring(mut self, parallel: bool) -> Self {
        self.parallel_scoring = parallel;
        self
    }

    /// Check that the cutoff is a finite positive number
    pub fn validate(&self) -> Result<()> {
        if !self.cutoff.is_finite() || self.cutoff <= 0.0 {
            return Err(EngineError::InvalidConfig {
                field: "cutoff".to_string(),
                value: self.cutoff.to_string(),
            });
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cutoff: DEFAULT_CUTOFF,
            same_score_window: DEFAULT_SAME_SCORE_WINDOW,
            parallel_scoring: true,
        }
    }
}
