//! Similarity between two rating profiles.
//!
//! The score is the squared cosine of the two rating vectors, zero-padded
//! over the union of their items:
//!
//! ```text
//! shared = Σ a[i] * b[i]   over items rated in both
//! norm_a = Σ a[i]²         norm_b = Σ b[i]²
//! score  = shared² / (norm_a * norm_b)
//! ```
//!
//! Squaring keeps the result in [0, 1] and widens the gap between weakly
//! and strongly aligned profiles.
//!
//! The score does not change when either vector is scaled, so each profile is
//! divided by its own largest rating before any products are taken. Every
//! scaled value is then at most 1 and each norm is at least 1, which keeps
//! very large or very small ratings from overflowing or underflowing.

use data_loader::RatingProfile;

/// Squared cosine similarity of `a` and `b`, in [0, 1].
///
/// Disjoint profiles and empty profiles score 0.0. Both profiles are walked
/// in ascending item order, so `similarity(a, b)` and `similarity(b, a)`
/// perform the same additions and return the same bits.
pub fn similarity(a: &RatingProfile, b: &RatingProfile) -> f64 {
    let (Some(scale_a), Some(scale_b)) = (max_rating(a), max_rating(b)) else {
        return 0.0;
    };
    let ((small, scale_small), (large, scale_large)) = if a.len() <= b.len() {
        ((a, scale_a), (b, scale_b))
    } else {
        ((b, scale_b), (a, scale_a))
    };

    let shared: f64 = small
        .iter()
        .filter_map(|(item_id, &rating)| {
            large
                .get(item_id)
                .map(|&other| (rating / scale_small) * (other / scale_large))
        })
        .sum();
    if shared == 0.0 || !shared.is_finite() {
        return 0.0;
    }

    let denominator = squared_norm(a, scale_a) * squared_norm(b, scale_b);
    if denominator == 0.0 || !denominator.is_finite() {
        return 0.0;
    }

    ((shared * shared) / denominator).clamp(0.0, 1.0)
}

/// Largest absolute rating, or `None` for an empty or degenerate profile
fn max_rating(profile: &RatingProfile) -> Option<f64> {
    let max = profile.values().fold(0.0_f64, |max, rating| max.max(rating.abs()));
    (max > 0.0 && max.is_finite()).then_some(max)
}

fn squared_norm(profile: &RatingProfile, scale: f64) -> f64 {
    profile
        .values()
        .map(|rating| {
            let scaled = rating / scale;
            scaled * scaled
        })
        .sum()
}
