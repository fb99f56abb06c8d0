use thiserror::Error;

use crate::relevance::RelevanceError;
use crate::vectordb::VectorDbError;

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("question must not be empty")]
    EmptyQuestion,

    #[error("top_k must be greater than 0")]
    InvalidTopK,

    #[error("embedding request failed: {message}")]
    EmbeddingFailed { message: String },

    #[error("embeddings request failed: {status} {body}")]
    EmbeddingStatus { status: u16, body: String },

    #[error("embeddings response missing data list")]
    MissingEmbedding,

    #[error(transparent)]
    VectorDb(#[from] VectorDbError),

    #[error(transparent)]
    Relevance(#[from] RelevanceError),
}

impl RetrievalError {
    /// Empty or fully gated result sets; callers may answer without evidence.
    pub fn is_no_evidence(&self) -> bool {
        matches!(self, RetrievalError::Relevance(e) if e.is_no_evidence())
    }
}
