use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CitationError {
    #[error("answer must not be empty")]
    EmptyAnswer,

    /// Upstream integrity violation; never retried.
    #[error("chunk '{chunk_id}' has empty text")]
    EmptyChunkText { chunk_id: String },
}
