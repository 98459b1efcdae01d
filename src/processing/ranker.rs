//! Threshold filtering and deterministic ordering of scored entities

use std::cmp::Ordering;

/// Anything the ranker can order: an id for tie-breaking and a score
pub trait Rankable {
    fn rank_id(&self) -> &str;
    fn rank_score(&self) -> f32;
}

/// Highest score first, then entity id ascending
pub fn compare_ranked<T: Rankable>(a: &T, b: &T) -> Ordering {
    b.rank_score()
        .total_cmp(&a.rank_score())
        .then_with(|| a.rank_id().cmp(b.rank_id()))
}

/// Keep items scoring at or above `threshold`, sort them, keep the first `limit`.
pub fn rank<T: Rankable>(items: Vec<T>, threshold: f32, limit: usize) -> Vec<T> {
    let mut kept: Vec<T> = items
        .into_iter()
        .filter(|item| item.rank_score() >= threshold)
        .collect();

    kept.sort_by(|a, b| compare_ranked(a, b));
    kept.truncate(limit);
    kept
}
