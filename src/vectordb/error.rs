use thiserror::Error;

use crate::relevance::RelevanceError;

#[derive(Debug, Error)]
/// Errors returned by chunk search operations.
pub enum VectorDbError {
    /// Could not connect to the Qdrant endpoint.
    #[error("failed to connect to Qdrant at '{url}': {message}")]
    ConnectionFailed {
        /// Endpoint URL.
        url: String,
        /// Error message.
        message: String,
    },

    /// Search failed.
    #[error("failed to search in '{collection}': {message}")]
    SearchFailed {
        /// Collection name.
        collection: String,
        /// Error message.
        message: String,
    },

    /// A chunk carried a relevance score outside `[0, 1]`.
    #[error("chunk '{chunk_id}' has score {score} outside [0, 1]")]
    InvalidScore {
        /// Offending chunk.
        chunk_id: String,
        /// Offending score.
        score: f32,
    },

    /// A search hit lacked a required payload field.
    #[error("search hit is missing payload field '{field}'")]
    MissingPayload {
        /// Missing field name.
        field: &'static str,
    },

    /// Chunks of one document disagree on its filename.
    #[error("inconsistent filename for doc_id={doc_id}: {first} != {second}")]
    InconsistentFilename {
        /// Document id.
        doc_id: String,
        /// Filename seen first.
        first: String,
        /// Conflicting filename.
        second: String,
    },

    /// A raw distance could not be turned into a relevance score.
    #[error("score derivation failed: {0}")]
    Relevance(#[from] RelevanceError),
}
