//! Battleground library crate (used by the server and integration tests).
//!
//! Answers questions over uploaded documents and compares two chat backends
//! side by side on the same grounded prompt.
//!
//! # Public API Surface
//!
//! ## Comparison
//! - [`ComparisonOrchestrator`], [`CompareStream`] - Concurrent two-sided streaming
//! - [`CompareRequest`], [`CompareStreamEvent`], [`Side`] - Request and event model
//!
//! ## Grounding
//! - [`RetrievalService`], [`Retriever`] - Query embedding, vector search, gating
//! - [`RelevanceGate`], [`distance_to_score`] - Relevance scoring
//! - [`CitationExtractor`], [`CitationCandidate`] - Answer-to-evidence attribution
//! - [`GroundedPrompt`] - Shared system and user prompts
//!
//! ## Providers
//! - [`ChatStreamer`] - The streaming completion capability
//! - [`ProviderRouter`], [`OpenAiCompatibleClient`] - Configured upstream backends
//!
//! ## Services & Server
//! - [`BattlegroundService`], [`ChatService`] - Request-level orchestration
//! - [`Config`], [`BackendProfiles`] - Environment configuration
//! - [`gateway`] - Axum routes
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod chat;
pub mod citation;
pub mod compare;
pub mod config;
pub mod constants;
pub mod gateway;
pub mod provider;
pub mod relevance;
pub mod retrieval;
pub mod service;
pub mod vectordb;

pub use chat::{ConversationTurn, GroundedPrompt, HistoryError, Role};
pub use citation::{CitationCandidate, CitationError, CitationExtractor};
pub use compare::{
    CompareError, CompareEventKind, CompareRequest, CompareStream, CompareStreamEvent,
    ComparisonOrchestrator, Side, SideError, SideSelection,
};
pub use config::{BackendProfiles, Config, ConfigError};
pub use constants::NO_DOCUMENT_EVIDENCE;
pub use provider::{
    BackendProfile, ChatStreamer, ModelOption, OpenAiCompatibleClient, ProviderError,
    ProviderKind, ProviderRouter, TextStream,
};
pub use relevance::{RelevanceError, RelevanceGate, distance_to_score, filter_by_relevance};
pub use retrieval::{Embedder, OpenAiEmbedder, RetrievalError, RetrievalService, Retriever};
pub use service::{
    BattlegroundService, ChatAnswer, ChatRequest, ChatService, Evidence, EvidenceSource,
    ServiceError,
};
pub use vectordb::{
    Chunk, DocumentCatalog, IndexedDocument, QdrantChunkStore, VectorDbError, VectorStore,
};

#[cfg(any(test, feature = "mock"))]
pub use provider::{MockCall, MockChatStreamer, MockScript};
#[cfg(any(test, feature = "mock"))]
pub use retrieval::{MockEmbedder, MockRetriever};
#[cfg(any(test, feature = "mock"))]
pub use vectordb::MockVectorStore;
