//! Neighbor discovery.
//!
//! ## Algorithm
//! 1. Collect every user who rated at least one item in the target profile
//!    (union of the index entries for the target's items)
//! 2. Score each of them against the target with [`similarity`]
//!
//! Nobody is dropped here for a low score; filtering happens when candidates
//! are selected.

use crate::error::{EngineError, Result};
use crate::similarity::similarity;
use data_loader::{ItemId, ItemUserIndex, RatingProfile, UserId, UserRatingTable};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, instrument};

/// Neighbor user id -> similarity to the target, ascending by user id
pub type NeighborSimilarity = BTreeMap<UserId, f64>;

/// Users in `index` who rated at least one of `items`, ascending
pub fn users_who_rated<'a>(
    items: impl IntoIterator<Item = &'a ItemId>,
    index: &ItemUserIndex,
) -> BTreeSet<UserId> {
    items
        .into_iter()
        .flat_map(|&item_id| index.users_who_rated(item_id).iter().copied())
        .collect()
}

/// Find the users sharing at least one rated item with `target` and their
/// similarity to it.
///
/// Fails with [`EngineError::UnknownUser`] if the index names a user the
/// table has no profile for.
#[instrument(skip_all, fields(target_items = target.len()))]
pub fn find_neighbors(
    target: &RatingProfile,
    table: &UserRatingTable,
    index: &ItemUserIndex,
) -> Result<NeighborSimilarity> {
    let users = users_who_rated(target.keys(), index);

    let neighbors = users
        .into_iter()
        .map(|user_id| {
            let profile = table
                .profile(user_id)
                .ok_or(EngineError::UnknownUser(user_id))?;
            Ok((user_id, similarity(target, profile)))
        })
        .collect::<Result<NeighborSimilarity>>()?;

    debug!("Found {} neighbors", neighbors.len());
    Ok(neighbors)
}
