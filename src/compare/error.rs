use std::time::Duration;
use thiserror::Error;

use super::types::Side;
use crate::chat::HistoryError;
use crate::provider::ProviderError;

/// Rejected comparison requests. Raised before any side worker starts.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CompareError {
    #[error("question must not be empty")]
    EmptyQuestion,

    #[error("{}_backend_id must not be empty", .side.field_prefix())]
    EmptyBackendId { side: Side },

    #[error("{} must not be empty", .side.field_prefix())]
    EmptyModel { side: Side },

    #[error("model_a and model_b selections must be different")]
    IdenticalSides,

    #[error(transparent)]
    History(#[from] HistoryError),

    #[error("{} is not allowed: {source}", .side.field_prefix())]
    SelectionNotAllowed {
        side: Side,
        #[source]
        source: ProviderError,
    },
}

/// Why one side ended with an `error` event.
#[derive(Debug, Error)]
pub enum SideError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("backend produced no output for {}s", .0.as_secs_f64())]
    IdleTimeout(Duration),
}
