//! # Recommendation Engine
//!
//! Coordinates the whole recommendation pipeline:
//! 1. Build (or validate) the item -> users index
//! 2. Find neighbors of the target profile
//! 3. Select candidate items
//! 4. Score candidates
//! 5. Rank and truncate to `k`
//!
//! No state is kept between calls. Every `recommend` builds its own index
//! and neighbor map from the table it is handed.

use std::collections::HashSet;
use std::time::Instant;

use tracing::{debug, info, instrument, warn};

use data_loader::{ItemId, ItemUserIndex, RatingProfile, UserId, UserRatingTable};

use crate::candidates::select_candidates;
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::neighbors::find_neighbors;
use crate::ranking::{Recommendation, rank_scored};
use crate::scoring::score_candidates;

/// Neighborhood-based recommender
#[derive(Debug, Clone, Default)]
pub struct RecommendationEngine {
    config: EngineConfig,
}

impl RecommendationEngine {
    /// Create an engine, rejecting an invalid configuration
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Recommend up to `k` items for `target`.
    ///
    /// `catalog_items` is the known-item set the table was sanitized with.
    /// Candidates outside it are dropped (with a warning), so an unsanitized
    /// table can never surface an unknown item. An empty result is not an
    /// error.
    pub fn recommend(
        &self,
        target: &RatingProfile,
        table: &UserRatingTable,
        catalog_items: &HashSet<ItemId>,
        k: usize,
    ) -> Result<Vec<ItemId>> {
        Ok(self
            .recommend_scored(target, table, catalog_items, k)?
            .into_iter()
            .map(|rec| rec.item_id)
            .collect())
    }

    /// Like [`Self::recommend`] but returns the scores alongside the ids
    #[instrument(skip_all, fields(target_items = target.len(), k = k))]
    pub fn recommend_scored(
        &self,
        target: &RatingProfile,
        table: &UserRatingTable,
        catalog_items: &HashSet<ItemId>,
        k: usize,
    ) -> Result<Vec<Recommendation>> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let index = ItemUserIndex::build(table);
        debug!("Built item-user index with {} items", index.len());

        self.run(target, table, &index, catalog_items, k)
    }

    /// Recommend using an index the caller already holds.
    ///
    /// Candidates are filtered against `catalog_items` exactly as in
    /// [`Self::recommend`]. Fails with [`EngineError::StaleIndex`] if `table`
    /// was mutated after `index` was built.
    #[instrument(skip_all, fields(target_items = target.len(), k = k))]
    pub fn recommend_with_index(
        &self,
        target: &RatingProfile,
        table: &UserRatingTable,
        index: &ItemUserIndex,
        catalog_items: &HashSet<ItemId>,
        k: usize,
    ) -> Result<Vec<ItemId>> {
        if !index.is_current_for(table) {
            return Err(EngineError::StaleIndex {
                index: index.generation(),
                table: table.generation(),
            });
        }
        if k == 0 {
            return Ok(Vec::new());
        }

        Ok(self
            .run(target, table, index, catalog_items, k)?
            .into_iter()
            .map(|rec| rec.item_id)
            .collect())
    }

    /// Recommend for a user already in the table, using their own profile as
    /// the target.
    pub fn recommend_for_user(
        &self,
        user_id: UserId,
        table: &UserRatingTable,
        catalog_items: &HashSet<ItemId>,
        k: usize,
    ) -> Result<Vec<Recommendation>> {
        let target = table
            .profile(user_id)
            .ok_or(EngineError::UnknownUser(user_id))?;
        self.recommend_scored(target, table, catalog_items, k)
    }

    fn run(
        &self,
        target: &RatingProfile,
        table: &UserRatingTable,
        index: &ItemUserIndex,
        catalog_items: &HashSet<ItemId>,
        k: usize,
    ) -> Result<Vec<Recommendation>> {
        let start_time = Instant::now();

        let neighbors = find_neighbors(target, table, index)?;
        if neighbors.is_empty() {
            info!("No neighbors share an item with the target");
            return Ok(Vec::new());
        }

        let mut candidates =
            select_candidates(target, neighbors.keys(), table, self.config.cutoff)?;
        let before = candidates.len();
        candidates.retain(|item_id| catalog_items.contains(item_id));
        if candidates.len() < before {
            warn!(
                "Dropped {} candidates missing from the catalog; was the table sanitized?",
                before - candidates.len()
            );
        }

        let scores = score_candidates(
            &candidates,
            &neighbors,
            table,
            index,
            self.config.cutoff,
            self.config.parallel_scoring,
        )?;

        let recommendations = rank_scored(&scores, k, self.config.same_score_window);

        info!(
            "Recommended {} items from {} neighbors and {} candidates in {:.2?}",
            recommendations.len(),
            neighbors.len(),
            candidates.len(),
            start_time.elapsed()
        );
        Ok(recommendations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{catalog_items, profile, small_table};

    #[test]
    fn test_recommend_fixture() {
        let engine = RecommendationEngine::default();
        let table = small_table();

        let recs = engine
            .recommend(&profile(&[(302156, 4.5)]), &table, &catalog_items(), 2)
            .unwrap();
        assert_eq!(recs, vec![68735]);

        let recs = engine
            .recommend(&profile(&[(68735, 4.5)]), &table, &catalog_items(), 2)
            .unwrap();
        assert_eq!(recs, vec![302156, 293660]);
    }

    #[test]
    fn test_zero_k() {
        let engine = RecommendationEngine::default();
        let recs = engine
            .recommend(&profile(&[(68735, 4.5)]), &small_table(), &catalog_items(), 0)
            .unwrap();
        assert!(recs.is_empty());
    }

    #[test]
    fn test_no_neighbors() {
        let engine = RecommendationEngine::default();
        let recs = engine
            .recommend(&profile(&[(1, 4.5)]), &small_table(), &catalog_items(), 5)
            .unwrap();
        assert!(recs.is_empty());
    }

    #[test]
    fn test_empty_target() {
        let engine = RecommendationEngine::default();
        let recs = engine
            .recommend(&RatingProfile::new(), &small_table(), &catalog_items(), 5)
            .unwrap();
        assert!(recs.is_empty());
    }

    #[test]
    fn test_unknown_catalog_candidates_are_dropped() {
        let engine = RecommendationEngine::default();
        let mut table = small_table();
        table.insert_rating(1, 777, 5.0);

        let recs = engine
            .recommend(&profile(&[(302156, 4.5)]), &table, &catalog_items(), 5)
            .unwrap();
        assert_eq!(recs, vec![68735]);
    }

    #[test]
    fn test_stale_index_rejected() {
        let engine = RecommendationEngine::default();
        let mut table = small_table();
        let index = ItemUserIndex::build(&table);
        let target = profile(&[(302156, 4.5)]);

        assert_eq!(
            engine
                .recommend_with_index(&target, &table, &index, &catalog_items(), 2)
                .unwrap(),
            vec![68735]
        );

        table.insert_rating(3, 302156, 5.0);
        let err = engine
            .recommend_with_index(&target, &table, &index, &catalog_items(), 2)
            .unwrap_err();
        assert!(matches!(err, EngineError::StaleIndex { .. }));
    }

    #[test]
    fn test_recommend_for_user() {
        let engine = RecommendationEngine::default();
        let mut table = small_table();
        table.insert_profile(3, profile(&[(302156, 4.5)]));

        let recs = engine
            .recommend_for_user(3, &table, &catalog_items(), 2)
            .unwrap();
        let ids: Vec<ItemId> = recs.iter().map(|rec| rec.item_id).collect();
        assert_eq!(ids, vec![68735]);

        let err = engine
            .recommend_for_user(99, &table, &catalog_items(), 2)
            .unwrap_err();
        assert_eq!(err, EngineError::UnknownUser(99));
    }

    #[test]
    fn test_invalid_config() {
        let config = EngineConfig::new().with_cutoff(-2.0);
        assert!(RecommendationEngine::new(config).is_err());
    }

    #[test]
    fn test_cutoff_changes_candidates() {
        let engine = RecommendationEngine::new(EngineConfig::new().with_cutoff(4.5)).unwrap();
        let recs = engine
            .recommend(&profile(&[(68735, 4.5)]), &small_table(), &catalog_items(), 5)
            .unwrap();
        // user 1 rated 302156 only 4.0, so only user 2's 293660 clears 4.5
        assert_eq!(recs, vec![293660]);
    }

    #[test]
    fn test_with_index_drops_unknown_catalog_candidates() {
        let engine = RecommendationEngine::default();
        let mut table = small_table();
        table.insert_rating(1, 777, 5.0);
        let index = ItemUserIndex::build(&table);
        let target = profile(&[(302156, 4.5)]);

        let with_index = engine
            .recommend_with_index(&target, &table, &index, &catalog_items(), 5)
            .unwrap();
        let fresh = engine.recommend(&target, &table, &catalog_items(), 5).unwrap();
        assert_eq!(with_index, vec![68735]);
        assert_eq!(with_index, fresh);
    }

    #[test]
    fn test_extreme_ratings_score_finite() {
        let engine = RecommendationEngine::default();
        let table: UserRatingTable = [
            (1, profile(&[(1, 1e160), (2, 4.0)])),
            (2, profile(&[(1, 4.0), (3, 5.0)])),
        ]
        .into_iter()
        .collect();
        let known: HashSet<ItemId> = [1, 2, 3].into_iter().collect();

        let recs = engine
            .recommend_scored(&profile(&[(1, 4.0)]), &table, &known, 5)
            .unwrap();
        let ids: Vec<ItemId> = recs.iter().map(|rec| rec.item_id).collect();
        assert_eq!(ids, vec![2, 3]);
        assert!(recs.iter().all(|rec| rec.score.is_finite() && rec.score > 0.0));
    }
}
