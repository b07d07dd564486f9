//! Candidate scoring.
//!
//! For each candidate item `m`:
//!
//! ```text
//! popularity(m)  = number of users in the whole table who rated m
//! qualifying(m)  = neighbors who rated m at or above the cutoff
//! breadth(u)     = number of candidates neighbor u rated at or above the cutoff
//! score(m)       = Σ over u in qualifying(m) of  sim(u) / (breadth(u) * popularity(m))
//! ```
//!
//! Dividing by `breadth` gives every neighbor one vote to spread over the
//! candidates they endorse. Dividing by `popularity` stops items from winning
//! just because many people rated them.
//!
//! ## Parallelism
//! With `parallel = true` each candidate is scored on the rayon pool. Inputs
//! are only borrowed immutably, every candidate writes its own `(item, score)`
//! pair, and the pairs are gathered into the result map once all of them are
//! done. Within a candidate, neighbors are summed in ascending user order, so
//! sequential and parallel runs produce identical scores.

use crate::candidates::CandidateSet;
use crate::error::{EngineError, Result};
use crate::neighbors::NeighborSimilarity;
use data_loader::{ItemId, ItemUserIndex, RatingValue, UserId, UserRatingTable};
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, instrument};

/// Candidate item id -> recommendation score, ascending by item id
pub type ItemScores = BTreeMap<ItemId, f64>;

/// Number of users (any rating, any user in the table) who rated `item_id`
pub fn popularity(item_id: ItemId, index: &ItemUserIndex) -> usize {
    index.popularity(item_id)
}

/// How many of `candidates` the user rated at or above `cutoff`
pub fn breadth(
    user_id: UserId,
    candidates: &CandidateSet,
    table: &UserRatingTable,
    cutoff: RatingValue,
) -> Result<usize> {
    let profile = table
        .profile(user_id)
        .ok_or(EngineError::UnknownUser(user_id))?;

    Ok(profile
        .iter()
        .filter(|&(item_id, &rating)| rating >= cutoff && candidates.contains(item_id))
        .count())
}

/// Neighbors who rated `item_id` at or above `cutoff`, ascending
pub fn qualifying_neighbors(
    item_id: ItemId,
    neighbors: &NeighborSimilarity,
    table: &UserRatingTable,
    index: &ItemUserIndex,
    cutoff: RatingValue,
) -> Result<Vec<UserId>> {
    let mut qualifying = Vec::new();

    for &user_id in index.users_who_rated(item_id) {
        if !neighbors.contains_key(&user_id) {
            continue;
        }
        let rating = table
            .profile(user_id)
            .ok_or(EngineError::UnknownUser(user_id))?
            .get(&item_id)
            .copied()
            .ok_or_else(|| EngineError::InvariantViolation {
                item: item_id,
                reason: format!("index lists user {} but their profile has no rating", user_id),
            })?;

        if rating >= cutoff {
            qualifying.push(user_id);
        }
    }

    Ok(qualifying)
}

/// Score every candidate.
///
/// Fails loudly with [`EngineError::InvariantViolation`] if a candidate has
/// no raters in the index or no qualifying neighbor. Neither can happen
/// when `index` was built from `table` and `candidates` came from
/// [`crate::candidates::select_candidates`] with the same cutoff.
#[instrument(skip_all, fields(candidates = candidates.len(), neighbors = neighbors.len()))]
pub fn score_candidates(
    candidates: &CandidateSet,
    neighbors: &NeighborSimilarity,
    table: &UserRatingTable,
    index: &ItemUserIndex,
    cutoff: RatingValue,
    parallel: bool,
) -> Result<ItemScores> {
    let breadths = neighbor_breadths(candidates, neighbors, table, cutoff)?;

    let score_one = |&item_id: &ItemId| -> Result<(ItemId, f64)> {
        let score = score_item(item_id, neighbors, &breadths, table, index, cutoff)?;
        Ok((item_id, score))
    };

    let scored: Vec<(ItemId, f64)> = if parallel {
        candidates.par_iter().map(score_one).collect::<Result<_>>()?
    } else {
        candidates.iter().map(score_one).collect::<Result<_>>()?
    };

    debug!("Scored {} candidates", scored.len());
    Ok(scored.into_iter().collect())
}

/// Breadth of every neighbor that endorses at least one candidate
fn neighbor_breadths(
    candidates: &CandidateSet,
    neighbors: &NeighborSimilarity,
    table: &UserRatingTable,
    cutoff: RatingValue,
) -> Result<HashMap<UserId, usize>> {
    let mut breadths = HashMap::new();
    for &user_id in neighbors.keys() {
        let count = breadth(user_id, candidates, table, cutoff)?;
        if count > 0 {
            breadths.insert(user_id, count);
        }
    }
    Ok(breadths)
}

fn score_item(
    item_id: ItemId,
    neighbors: &NeighborSimilarity,
    breadths: &HashMap<UserId, usize>,
    table: &UserRatingTable,
    index: &ItemUserIndex,
    cutoff: RatingValue,
) -> Result<f64> {
    let popularity = popularity(item_id, index);
    if popularity == 0 {
        return Err(EngineError::InvariantViolation {
            item: item_id,
            reason: "candidate has no raters in the item-user index".to_string(),
        });
    }

    let qualifying = qualifying_neighbors(item_id, neighbors, table, index, cutoff)?;
    if qualifying.is_empty() {
        return Err(EngineError::InvariantViolation {
            item: item_id,
            reason: "candidate has no qualifying neighbor".to_string(),
        });
    }

    let mut score = 0.0;
    for user_id in qualifying {
        let similarity = neighbors[&user_id];
        let breadth = match breadths.get(&user_id) {
            Some(&count) if count > 0 => count,
            _ => {
                return Err(EngineError::InvariantViolation {
                    item: item_id,
                    reason: format!("neighbor {} endorses the item but has zero breadth", user_id),
                });
            }
        };
        score += similarity / (breadth as f64 * popularity as f64);
    }

    Ok(score)
}
