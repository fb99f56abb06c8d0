use thiserror::Error;

use crate::chat::HistoryError;
use crate::citation::CitationError;
use crate::compare::CompareError;
use crate::provider::ProviderError;
use crate::retrieval::RetrievalError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },

    #[error(transparent)]
    History(#[from] HistoryError),

    #[error(transparent)]
    Compare(#[from] CompareError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Retrieval(#[from] RetrievalError),

    #[error(transparent)]
    Citation(#[from] CitationError),
}

impl ServiceError {
    /// Caller input problems, as opposed to upstream or integrity failures.
    pub fn is_validation(&self) -> bool {
        match self {
            ServiceError::EmptyField { .. }
            | ServiceError::History(_)
            | ServiceError::Compare(_) => true,
            ServiceError::Provider(e) => e.is_selection_error(),
            ServiceError::Retrieval(RetrievalError::EmptyQuestion) => true,
            _ => false,
        }
    }
}
