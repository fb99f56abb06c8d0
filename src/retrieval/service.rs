use async_trait::async_trait;
use tracing::{info, instrument};

use super::embedder::Embedder;
use super::error::RetrievalError;
use crate::relevance::RelevanceGate;
use crate::vectordb::{Chunk, VectorStore};

/// Source of gated evidence chunks for a query.
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn retrieve(&self, query: &str) -> Result<Vec<Chunk>, RetrievalError>;
}

/// Embeds the query, searches the vector store, then applies the relevance gate.
pub struct RetrievalService<E, V> {
    embedder: E,
    store: V,
    top_k: u64,
    gate: RelevanceGate,
}

impl<E, V> RetrievalService<E, V>
where
    E: Embedder,
    V: VectorStore,
{
    pub fn new(
        embedder: E,
        store: V,
        top_k: u64,
        gate: RelevanceGate,
    ) -> Result<Self, RetrievalError> {
        if top_k == 0 {
            return Err(RetrievalError::InvalidTopK);
        }
        Ok(Self {
            embedder,
            store,
            top_k,
            gate,
        })
    }

    pub fn embedder(&self) -> &E {
        &self.embedder
    }

    pub fn store(&self) -> &V {
        &self.store
    }

    pub fn top_k(&self) -> u64 {
        self.top_k
    }

    pub fn gate(&self) -> &RelevanceGate {
        &self.gate
    }
}

#[async_trait]
impl<E, V> Retriever for RetrievalService<E, V>
where
    E: Embedder,
    V: VectorStore,
{
    #[instrument(skip(self, query), fields(query_length = query.len()))]
    async fn retrieve(&self, query: &str) -> Result<Vec<Chunk>, RetrievalError> {
        if query.trim().is_empty() {
            return Err(RetrievalError::EmptyQuestion);
        }

        let embedding = self.embedder.embed(query).await?;
        let raw = self.store.query(embedding, self.top_k).await?;
        let raw_count = raw.len();
        let chunks = self.gate.filter(raw)?;

        info!(raw_count, result_count = chunks.len(), "Retrieval completed");
        Ok(chunks)
    }
}
