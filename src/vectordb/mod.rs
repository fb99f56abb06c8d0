//! Qdrant-backed chunk search.

pub mod client;
pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod model;


pub use client::{DocumentCatalog, QdrantChunkStore, VectorStore};
pub use error::VectorDbError;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockVectorStore;
pub use model::{Chunk, IndexedDocument, similarity_to_distance, summarize_documents};

pub const DEFAULT_COLLECTION_NAME: &str = "documents";
