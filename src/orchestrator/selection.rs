//! Candidate scoring and selection.

use serde::Serialize;
use utoipa::ToSchema;

use crate::types::CandidateSource;

const SIZE_WEIGHT: f64 = 0.60;
const SEEDER_WEIGHT: f64 = 0.35;
const ORDER_WEIGHT: f64 = 0.05;

/// Scores closer than this are treated as equal
const TIE_EPSILON: f64 = 0.001;

/// Per-candidate score breakdown
#[derive(Clone, Copy, Debug, PartialEq, Serialize, ToSchema)]
pub struct CandidateScore {
    /// Position in the search result list
    pub index: usize,
    /// `1 - |size - reference| / max(size, reference)`
    pub size_similarity: f64,
    /// Seeders relative to the best-seeded candidate in the same list
    pub seeder_score: f64,
    /// Small bonus for earlier search positions
    pub order_score: f64,
    /// Weighted total
    pub total: f64,
}

/// Score every candidate against the reference size
///
/// Seeders are normalized within this list only.
pub fn score_candidates(candidates: &[CandidateSource], reference_size: u64) -> Vec<CandidateScore> {
    let count = candidates.len() as f64;
    let max_seeders = candidates
        .iter()
        .map(|c| c.seeders)
        .max()
        .unwrap_or(0)
        .max(1) as f64;

    candidates
        .iter()
        .enumerate()
        .map(|(index, candidate)| {
            let size_similarity = size_similarity(candidate.size_bytes, reference_size);
            let seeder_score = candidate.seeders as f64 / max_seeders;
            let order_score = 1.0 - (index as f64 / count) * 0.1;

            CandidateScore {
                index,
                size_similarity,
                seeder_score,
                order_score,
                total: SIZE_WEIGHT * size_similarity
                    + SEEDER_WEIGHT * seeder_score
                    + ORDER_WEIGHT * order_score,
            }
        })
        .collect()
}

fn size_similarity(size: u64, reference: u64) -> f64 {
    let largest = size.max(reference);
    if largest == 0 {
        // Both unknown: nothing to tell them apart
        return 1.0;
    }
    1.0 - size.abs_diff(reference) as f64 / largest as f64
}

/// Pick the best candidate for an episode
///
/// Returns `None` for an empty list and the only element of a singleton
/// without scoring. Otherwise the highest total wins; a candidate must beat
/// an earlier one by at least 0.001 to displace it.
pub fn select_best_candidate(
    candidates: &[CandidateSource],
    reference_size: u64,
) -> Option<&CandidateSource> {
    match candidates {
        [] => None,
        [only] => Some(only),
        _ => {
            let scores = score_candidates(candidates, reference_size);
            let mut best = &scores[0];
            for score in &scores[1..] {
                if score.total - best.total >= TIE_EPSILON {
                    best = score;
                }
            }
            tracing::debug!(
                index = best.index,
                total = best.total,
                candidates = candidates.len(),
                "Selected candidate"
            );
            candidates.get(best.index)
        }
    }
}
