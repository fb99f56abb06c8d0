use futures_util::StreamExt;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};

use super::error::ServiceError;
use super::evidence::EvidenceSource;
use crate::chat::{ConversationTurn, GroundedPrompt, strip_inline_citations, validate_history};
use crate::citation::{CitationCandidate, CitationExtractor};
use crate::provider::{ChatStreamer, ProviderRouter, TextStream};
use crate::vectordb::Chunk;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    pub question: String,
    pub history: Vec<ConversationTurn>,
    pub backend_id: String,
    pub model: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatAnswer {
    pub answer: String,
    pub citations: Vec<CitationCandidate>,
    pub grounded: bool,
    pub retrieved_count: usize,
}

/// Single-backend grounded question answering.
#[derive(Clone)]
pub struct ChatService {
    router: Arc<ProviderRouter>,
    evidence: EvidenceSource,
    extractor: CitationExtractor,
}

impl ChatService {
    pub fn new(router: Arc<ProviderRouter>, evidence: EvidenceSource) -> Self {
        Self {
            router,
            evidence,
            extractor: CitationExtractor::default(),
        }
    }

    pub fn with_extractor(mut self, extractor: CitationExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Collects the full answer, strips inline markers and attributes spans to evidence.
    #[instrument(skip_all, fields(backend_id = %request.backend_id, model = %request.model))]
    pub async fn answer(&self, request: &ChatRequest) -> Result<ChatAnswer, ServiceError> {
        let (mut fragments, chunks) = self.open(request).await?;

        let mut raw = String::new();
        while let Some(fragment) = fragments.next().await {
            raw.push_str(&fragment?);
        }

        let answer = strip_inline_citations(&raw);
        let citations = if answer.is_empty() || chunks.is_empty() {
            Vec::new()
        } else {
            self.extractor.extract(&answer, &chunks)?
        };

        info!(
            grounded = !chunks.is_empty(),
            retrieved_count = chunks.len(),
            citation_count = citations.len(),
            "Chat answer completed"
        );

        Ok(ChatAnswer {
            answer,
            citations,
            grounded: !chunks.is_empty(),
            retrieved_count: chunks.len(),
        })
    }

    /// Streams the raw answer text as it arrives.
    pub async fn answer_stream(&self, request: &ChatRequest) -> Result<TextStream, ServiceError> {
        let (fragments, _) = self.open(request).await?;
        Ok(fragments)
    }

    async fn open(&self, request: &ChatRequest) -> Result<(TextStream, Vec<Chunk>), ServiceError> {
        let question = request.question.trim();
        if question.is_empty() {
            return Err(ServiceError::EmptyField { field: "question" });
        }
        if request.backend_id.trim().is_empty() {
            return Err(ServiceError::EmptyField {
                field: "backend_id",
            });
        }
        if request.model.trim().is_empty() {
            return Err(ServiceError::EmptyField { field: "model" });
        }
        validate_history(&request.history)?;
        self.router
            .ensure_allowed(&request.backend_id, &request.model)?;

        let evidence = self.evidence.gather(question, &request.history).await?;
        let prompt = GroundedPrompt::build(
            question,
            &request.history,
            &evidence.chunks,
            &evidence.documents,
        );

        let fragments = self
            .router
            .stream(&request.backend_id, &request.model, &prompt.system, &prompt.user)
            .await?;
        Ok((fragments, evidence.chunks))
    }
}
