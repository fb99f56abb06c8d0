use async_trait::async_trait;
use std::sync::Mutex;

use super::{Chunk, DocumentCatalog, IndexedDocument, VectorDbError, VectorStore, summarize_documents};

/// In-memory [`VectorStore`] returning a fixed result set.
#[derive(Default)]
pub struct MockVectorStore {
    chunks: Vec<Chunk>,
    queries: Mutex<Vec<(Vec<f32>, u64)>>,
}

impl MockVectorStore {
    pub fn new(chunks: Vec<Chunk>) -> Self {
        Self {
            chunks,
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Returns every `(embedding, top_k)` pair seen so far.
    pub fn queries(&self) -> Vec<(Vec<f32>, u64)> {
        self.queries
            .lock()
            .map(|q| q.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl VectorStore for MockVectorStore {
    async fn query(&self, embedding: Vec<f32>, top_k: u64) -> Result<Vec<Chunk>, VectorDbError> {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push((embedding, top_k));
        }

        Ok(self.chunks.iter().take(top_k as usize).cloned().collect())
    }
}

/// Derives the catalog from the fixed chunks.
#[async_trait]
impl DocumentCatalog for MockVectorStore {
    async fn list_documents(&self) -> Result<Vec<IndexedDocument>, VectorDbError> {
        summarize_documents(
            self.chunks
                .iter()
                .map(|c| (c.doc_id().to_string(), c.filename().to_string())),
        )
    }
}
