//! Ranking and truncation.
//!
//! Final order is score descending, then item id ascending. Ranking runs in
//! two phases:
//!
//! 1. **Coarse**: keep the `k + same_score_window` best entries by score
//!    alone (`select_nth_unstable_by`, linear time).
//! 2. **Exact**: sort what was kept by (score desc, id asc) and take `k`.
//!
//! This is an approximation. If more items tie with the `k`-th score than
//! the window leaves room for, phase 1 decides which of the tied items
//! survive, and the survivors are not necessarily the lowest ids. The
//! choice is still deterministic because the input map is ordered. Widen
//! the window (or make it `usize::MAX`) to get a fully exact tie-break.

use crate::scoring::ItemScores;
use data_loader::ItemId;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A ranked recommendation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub item_id: ItemId,
    pub score: f64,
}

/// Best `k` item ids from `scores`, in rank order
pub fn rank(scores: &ItemScores, k: usize, same_score_window: usize) -> Vec<ItemId> {
    rank_scored(scores, k, same_score_window)
        .into_iter()
        .map(|rec| rec.item_id)
        .collect()
}

/// Like [`rank`] but keeps the scores
pub fn rank_scored(
    scores: &ItemScores,
    k: usize,
    same_score_window: usize,
) -> Vec<Recommendation> {
    if k == 0 || scores.is_empty() {
        return Vec::new();
    }

    let mut entries: Vec<Recommendation> = scores
        .iter()
        .map(|(&item_id, &score)| Recommendation { item_id, score })
        .collect();

    let keep = k.saturating_add(same_score_window);
    if entries.len() > keep {
        entries.select_nth_unstable_by(keep - 1, by_score_desc);
        entries.truncate(keep);
    }

    entries.sort_by(|a, b| by_score_desc(a, b).then_with(|| a.item_id.cmp(&b.item_id)));
    entries.truncate(k);
    entries
}

fn by_score_desc(a: &Recommendation, b: &Recommendation) -> Ordering {
    b.score.total_cmp(&a.score)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(pairs: &[(ItemId, f64)]) -> ItemScores {
        pairs.iter().copied().collect()
    }

    fn fixture_scores() -> ItemScores {
        scores(&[
            (3333, 3.0),
            (2345, 3.0),
            (1111, 4.0),
            (2555, 1.0),
            (1133, 1.0),
            (3557, 1.5),
        ])
    }

    #[test]
    fn test_sort_with_tie_break() {
        let s = fixture_scores();
        assert_eq!(rank(&s, 6, 10), vec![1111, 2345, 3333, 3557, 1133, 2555]);
    }

    #[test]
    fn test_truncates_to_k() {
        let s = fixture_scores();
        assert_eq!(rank(&s, 2, 10), vec![1111, 2345]);
        assert_eq!(rank(&s, 3, 0), vec![1111, 2345, 3333]);
    }

    #[test]
    fn test_fewer_than_k() {
        let s = scores(&[(7, 0.5), (3, 0.9)]);
        assert_eq!(rank(&s, 10, 10), vec![3, 7]);
    }

    #[test]
    fn test_zero_k_and_empty() {
        let s = scores(&[(7, 0.5)]);
        assert!(rank(&s, 0, 10).is_empty());
        assert!(rank(&ItemScores::new(), 5, 10).is_empty());
    }

    #[test]
    fn test_equal_scores_ascending_within_window() {
        let s: ItemScores = (1..=12).rev().map(|item_id| (item_id * 10, 0.25)).collect();
        let ranked = rank(&s, 5, 10);
        assert_eq!(ranked, vec![10, 20, 30, 40, 50]);
    }

    #[test]
    fn test_ties_past_the_window_edge() {
        // six items tie behind the leader but only k + window = 3 survive phase 1
        let mut s: ItemScores = (1..=6).map(|item_id| (item_id, 0.5)).collect();
        s.insert(99, 1.0);

        let first = rank(&s, 3, 0);
        assert_eq!(first.len(), 3);
        assert_eq!(first[0], 99);
        assert!(first[1] < first[2]);
        assert!(first[1..].iter().all(|item_id| (1..=6).contains(item_id)));

        for _ in 0..10 {
            assert_eq!(rank(&s, 3, 0), first);
        }
    }

    #[test]
    fn test_huge_k_does_not_overflow() {
        let s = scores(&[(1, 0.1), (2, 0.2)]);
        assert_eq!(rank(&s, usize::MAX, 10), vec![2, 1]);
        assert_eq!(rank(&s, 1, usize::MAX), vec![2]);
    }

    #[test]
    fn test_window_only_limits_ties() {
        // distinct scores rank exactly no matter how small the window
        let s: ItemScores = (1..=50).map(|item_id| (item_id, item_id as f64)).collect();
        assert_eq!(rank(&s, 3, 0), vec![50, 49, 48]);
    }

    #[test]
    fn test_rank_scored_keeps_scores() {
        let s = scores(&[(1, 0.1), (2, 0.2)]);
        let ranked = rank_scored(&s, 2, 10);
        assert_eq!(ranked[0], Recommendation { item_id: 2, score: 0.2 });
        assert_eq!(ranked[1], Recommendation { item_id: 1, score: 0.1 });
    }
}
