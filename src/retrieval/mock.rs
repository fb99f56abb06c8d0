use async_trait::async_trait;
use std::sync::Mutex;

use super::embedder::Embedder;
use super::error::RetrievalError;
use super::service::Retriever;
use crate::relevance::RelevanceError;
use crate::vectordb::Chunk;

/// Returns the same vector for every input and records what it was asked to embed.
pub struct MockEmbedder {
    vector: Vec<f32>,
    inputs: Mutex<Vec<String>>,
}

impl MockEmbedder {
    pub fn new(vector: Vec<f32>) -> Self {
        Self {
            vector,
            inputs: Mutex::new(Vec::new()),
        }
    }

    pub fn inputs(&self) -> Vec<String> {
        self.inputs.lock().map(|i| i.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Embedder for MockEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, RetrievalError> {
        if let Ok(mut inputs) = self.inputs.lock() {
            inputs.push(text.to_string());
        }
        Ok(self.vector.clone())
    }
}

#[derive(Debug, Clone)]
enum Outcome {
    Chunks(Vec<Chunk>),
    Gated(RelevanceError),
    Unavailable(String),
}

/// Scripted [`Retriever`] that records every query.
#[derive(Debug)]
pub struct MockRetriever {
    outcome: Outcome,
    queries: Mutex<Vec<String>>,
}

impl MockRetriever {
    fn with_outcome(outcome: Outcome) -> Self {
        Self {
            outcome,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn new(chunks: Vec<Chunk>) -> Self {
        Self::with_outcome(Outcome::Chunks(chunks))
    }

    /// Every result fell below the relevance threshold.
    pub fn no_relevant_results() -> Self {
        Self::with_outcome(Outcome::Gated(RelevanceError::NoRelevantResults))
    }

    /// The vector store came back empty.
    pub fn empty() -> Self {
        Self::with_outcome(Outcome::Gated(RelevanceError::EmptyResultSet))
    }

    /// Fails as if the embedding provider were down.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::with_outcome(Outcome::Unavailable(message.into()))
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().map(|q| q.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Retriever for MockRetriever {
    async fn retrieve(&self, query: &str) -> Result<Vec<Chunk>, RetrievalError> {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(query.to_string());
        }
        match &self.outcome {
            Outcome::Chunks(chunks) => Ok(chunks.clone()),
            Outcome::Gated(e) => Err(RetrievalError::Relevance(e.clone())),
            Outcome::Unavailable(message) => Err(RetrievalError::EmbeddingFailed {
                message: message.clone(),
            }),
        }
    }
}
