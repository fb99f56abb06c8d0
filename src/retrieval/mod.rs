//! Query embedding, vector search and relevance gating.

pub mod embedder;
pub mod error;
pub mod service;

#[cfg(any(test, feature = "mock"))]
pub mod mock;


pub use embedder::{Embedder, OpenAiEmbedder};
pub use error::RetrievalError;
pub use service::{RetrievalService, Retriever};

#[cfg(any(test, feature = "mock"))]
pub use mock::{MockEmbedder, MockRetriever};
