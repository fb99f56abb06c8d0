use async_trait::async_trait;
use qdrant_client::Qdrant;
use qdrant_client::qdrant::{PointId, ScrollPointsBuilder, SearchPointsBuilder, Value};
use std::collections::HashMap;
use tracing::{debug, info};

use super::error::VectorDbError;
use super::model::{Chunk, IndexedDocument, similarity_to_distance, summarize_documents};
use crate::relevance::distance_to_score;

/// Similarity search over indexed document chunks.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Returns up to `top_k` chunks nearest to `embedding`, scores normalized to `[0, 1]`.
    async fn query(&self, embedding: Vec<f32>, top_k: u64) -> Result<Vec<Chunk>, VectorDbError>;
}

/// Lists the documents currently indexed.
#[async_trait]
pub trait DocumentCatalog: Send + Sync {
    async fn list_documents(&self) -> Result<Vec<IndexedDocument>, VectorDbError>;
}

const SCROLL_PAGE_SIZE: u32 = 256;

#[derive(Clone)]
/// Qdrant-backed chunk store (cosine collections).
pub struct QdrantChunkStore {
    client: Qdrant,
    url: String,
    collection: String,
}

impl QdrantChunkStore {
    /// Creates a store for `collection` at `url`.
    pub fn new(url: &str, collection: impl Into<String>) -> Result<Self, VectorDbError> {
        let client =
            Qdrant::from_url(url)
                .build()
                .map_err(|e| VectorDbError::ConnectionFailed {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;

        Ok(Self {
            client,
            url: url.to_string(),
            collection: collection.into(),
        })
    }

    /// Returns the configured URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the collection searched by this store.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Performs a basic health check request.
    pub async fn health_check(&self) -> Result<(), VectorDbError> {
        self.client
            .health_check()
            .await
            .map_err(|e| VectorDbError::ConnectionFailed {
                url: self.url.clone(),
                message: e.to_string(),
            })?;
        Ok(())
    }
}

#[async_trait]
impl VectorStore for QdrantChunkStore {
    async fn query(&self, embedding: Vec<f32>, top_k: u64) -> Result<Vec<Chunk>, VectorDbError> {
        let search = SearchPointsBuilder::new(self.collection.as_str(), embedding, top_k)
            .with_payload(true);

        let response = self
            .client
            .search_points(search)
            .await
            .map_err(|e| VectorDbError::SearchFailed {
                collection: self.collection.clone(),
                message: e.to_string(),
            })?;

        let mut chunks = Vec::with_capacity(response.result.len());
        for point in &response.result {
            let score = distance_to_score(similarity_to_distance(point.score))?;
            chunks.push(Chunk::from_scored_point(point, score)?);
        }

        debug!(
            collection = %self.collection,
            hit_count = chunks.len(),
            "Chunk search completed"
        );
        Ok(chunks)
    }
}

#[async_trait]
impl DocumentCatalog for QdrantChunkStore {
    async fn list_documents(&self) -> Result<Vec<IndexedDocument>, VectorDbError> {
        let mut entries = Vec::new();
        let mut offset: Option<PointId> = None;

        loop {
            let mut scroll = ScrollPointsBuilder::new(self.collection.as_str())
                .limit(SCROLL_PAGE_SIZE)
                .with_payload(true)
                .with_vectors(false);
            if let Some(offset) = offset.take() {
                scroll = scroll.offset(offset);
            }

            let response =
                self.client
                    .scroll(scroll)
                    .await
                    .map_err(|e| VectorDbError::SearchFailed {
                        collection: self.collection.clone(),
                        message: e.to_string(),
                    })?;

            for point in &response.result {
                entries.push(document_entry(&point.payload)?);
            }

            match response.next_page_offset {
                Some(next) => offset = Some(next),
                None => break,
            }
        }

        let documents = summarize_documents(entries)?;
        info!(
            collection = %self.collection,
            document_count = documents.len(),
            "Listed indexed documents"
        );
        Ok(documents)
    }
}

fn document_entry(payload: &HashMap<String, Value>) -> Result<(String, String), VectorDbError> {
    let field = |name: &'static str| {
        payload
            .get(name)
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or(VectorDbError::MissingPayload { field: name })
    };
    Ok((field("doc_id")?, field("filename")?))
}
