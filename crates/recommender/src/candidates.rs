//! Candidate selection.
//!
//! An item is a candidate when the target has not rated it and at least one
//! neighbor rated it at or above the cutoff. The set is not bounded here;
//! truncation only happens at ranking time so every eligible item gets
//! scored.

use crate::error::{EngineError, Result};
use data_loader::{ItemId, RatingProfile, RatingValue, UserId, UserRatingTable};
use std::collections::BTreeSet;
use tracing::{debug, instrument};

/// Candidate item ids, ascending
pub type CandidateSet = BTreeSet<ItemId>;

/// Collect the items `neighbors` endorse that `target` has not rated
#[instrument(skip_all, fields(target_items = target.len(), cutoff = cutoff))]
pub fn select_candidates<'a>(
    target: &RatingProfile,
    neighbors: impl IntoIterator<Item = &'a UserId>,
    table: &UserRatingTable,
    cutoff: RatingValue,
) -> Result<CandidateSet> {
    let mut candidates = CandidateSet::new();

    for &user_id in neighbors {
        let profile = table
            .profile(user_id)
            .ok_or(EngineError::UnknownUser(user_id))?;

        candidates.extend(
            profile
                .iter()
                .filter(|&(item_id, &rating)| rating >= cutoff && !target.contains_key(item_id))
                .map(|(&item_id, _)| item_id),
        );
    }

    debug!("Selected {} candidates", candidates.len());
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{profile, small_table};

    #[test]
    fn test_select_candidates() {
        let table = small_table();
        let target = profile(&[(293660, 4.5)]);

        let candidates = select_candidates(&target, &[1, 2], &table, 3.5).unwrap();

        let ids: Vec<ItemId> = candidates.into_iter().collect();
        assert_eq!(ids, vec![68735, 302156]);
    }

    #[test]
    fn test_target_items_are_never_candidates() {
        let table = small_table();
        let target = profile(&[(68735, 4.5), (302156, 1.0)]);

        let candidates = select_candidates(&target, &[1, 2], &table, 3.5).unwrap();

        assert!(!candidates.contains(&68735));
        assert!(!candidates.contains(&302156));
        assert_eq!(candidates.into_iter().collect::<Vec<_>>(), vec![293660]);
    }

    #[test]
    fn test_cutoff_is_inclusive() {
        let table = small_table();
        let target = profile(&[(293660, 4.5)]);

        // user 1 rated 68735 exactly 3.5
        let candidates = select_candidates(&target, &[1], &table, 3.5).unwrap();
        assert!(candidates.contains(&68735));

        let stricter = select_candidates(&target, &[1], &table, 3.6).unwrap();
        assert!(!stricter.contains(&68735));
        assert!(stricter.contains(&302156));
    }

    #[test]
    fn test_no_neighbors() {
        let table = small_table();
        let no_neighbors: Vec<UserId> = Vec::new();
        let candidates =
            select_candidates(&profile(&[(1, 3.0)]), &no_neighbors, &table, 3.5).unwrap();
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_unknown_neighbor() {
        let table = small_table();
        let err = select_candidates(&profile(&[(1, 3.0)]), &[42], &table, 3.5).unwrap_err();
        assert_eq!(err, EngineError::UnknownUser(42));
    }
}
