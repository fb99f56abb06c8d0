use tracing::debug;

use super::error::RelevanceError;
use crate::vectordb::Chunk;

/// Maps a non-negative vector distance to a relevance score in `(0, 1]`.
///
/// `score = 1 / (1 + distance)`, so `0 -> 1.0`, `1 -> 0.5`, `3 -> 0.25`.
pub fn distance_to_score(distance: f32) -> Result<f32, RelevanceError> {
    if distance.is_nan() || distance < 0.0 {
        return Err(RelevanceError::InvalidDistance { distance });
    }
    Ok(1.0 / (1.0 + distance))
}

/// Keeps the chunks scoring at least `min_score`, preserving order.
pub fn filter_by_relevance(results: Vec<Chunk>, min_score: f32) -> Result<Vec<Chunk>, RelevanceError> {
    if results.is_empty() {
        return Err(RelevanceError::EmptyResultSet);
    }

    let total = results.len();
    let kept: Vec<Chunk> = results
        .into_iter()
        .filter(|chunk| chunk.score() >= min_score)
        .collect();

    debug!(
        total,
        kept = kept.len(),
        min_score,
        "Applied relevance threshold"
    );

    if kept.is_empty() {
        return Err(RelevanceError::NoRelevantResults);
    }
    Ok(kept)
}

/// Threshold filter for retrieved chunks.
///
/// The threshold is validated once here, so [`RelevanceGate::filter`] can only
/// fail on the result set itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelevanceGate {
    min_score: f32,
}

impl RelevanceGate {
    pub fn new(min_score: f32) -> Result<Self, RelevanceError> {
        if !(0.0..=1.0).contains(&min_score) {
            return Err(RelevanceError::InvalidThreshold {
                threshold: min_score,
            });
        }
        Ok(Self { min_score })
    }

    pub fn min_score(&self) -> f32 {
        self.min_score
    }

    pub fn filter(&self, results: Vec<Chunk>) -> Result<Vec<Chunk>, RelevanceError> {
        filter_by_relevance(results, self.min_score)
    }
}
