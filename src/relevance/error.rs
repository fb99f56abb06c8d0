use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RelevanceError {
    /// The vector store returned nothing to gate.
    #[error("retrieval returned no results")]
    EmptyResultSet,

    /// Results came back but none reached the threshold.
    #[error("no results passed relevance threshold")]
    NoRelevantResults,

    /// A raw distance was negative (or not a number).
    #[error("distance must be non-negative, got: {distance}")]
    InvalidDistance { distance: f32 },

    /// Gate configured with a threshold outside `[0, 1]`.
    #[error("relevance threshold must be between 0.0 and 1.0, got {threshold}")]
    InvalidThreshold { threshold: f32 },
}

impl RelevanceError {
    /// Returns `true` when the error means "no usable evidence" rather than a fault.
    pub fn is_no_evidence(&self) -> bool {
        matches!(
            self,
            RelevanceError::EmptyResultSet | RelevanceError::NoRelevantResults
        )
    }
}
