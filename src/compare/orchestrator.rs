use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use super::error::CompareError;
use super::stream::{CompareStream, Launch};
use super::types::{CompareRequest, Side};
use crate::chat::{GroundedPrompt, validate_history};
use crate::constants::DEFAULT_QUEUE_CAPACITY;
use crate::provider::ChatStreamer;
use crate::vectordb::{Chunk, IndexedDocument};

/// Runs two backend/model selections concurrently against one shared prompt.
#[derive(Clone)]
pub struct ComparisonOrchestrator {
    streamer: Arc<dyn ChatStreamer>,
    queue_capacity: usize,
    idle_timeout: Option<Duration>,
}

impl ComparisonOrchestrator {
    pub fn new(streamer: Arc<dyn ChatStreamer>) -> Self {
        Self {
            streamer,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            idle_timeout: None,
        }
    }

    /// Capacity of the shared event queue. Clamped to at least 1.
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }

    /// Ends a side with an `error` event if its backend stays silent this long.
    pub fn with_idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.idle_timeout = timeout;
        self
    }

    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }

    pub fn idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout
    }

    /// Checks a request without side effects.
    pub fn validate(request: &CompareRequest) -> Result<(), CompareError> {
        if request.question.trim().is_empty() {
            return Err(CompareError::EmptyQuestion);
        }

        for side in Side::BOTH {
            let selection = request.selection(side);
            if selection.backend_id.trim().is_empty() {
                return Err(CompareError::EmptyBackendId { side });
            }
            if selection.model.trim().is_empty() {
                return Err(CompareError::EmptyModel { side });
            }
        }

        if request.side_a.normalized() == request.side_b.normalized() {
            return Err(CompareError::IdenticalSides);
        }

        validate_history(&request.history)?;
        Ok(())
    }

    /// Compares the two sides on a prompt built without document evidence.
    pub fn compare_stream(&self, request: &CompareRequest) -> Result<CompareStream, CompareError> {
        self.compare_grounded(request, &[], &[])
    }

    /// Compares the two sides on a prompt grounded in `chunks` that also lists `documents`.
    ///
    /// Nothing runs until the returned stream is first polled.
    pub fn compare_grounded(
        &self,
        request: &CompareRequest,
        chunks: &[Chunk],
        documents: &[IndexedDocument],
    ) -> Result<CompareStream, CompareError> {
        Self::validate(request)?;

        let prompt = GroundedPrompt::build(
            request.question.trim(),
            &request.history,
            chunks,
            documents,
        );

        info!(
            question_length = request.question.len(),
            history_turns = request.history.len(),
            side_a = %request.side_a,
            side_b = %request.side_b,
            evidence_chunks = chunks.len(),
            available_documents = documents.len(),
            "Comparison prepared"
        );

        Ok(CompareStream::new(Launch {
            streamer: Arc::clone(&self.streamer),
            sides: [request.side_a.normalized(), request.side_b.normalized()],
            prompt: Arc::new(prompt),
            queue_capacity: self.queue_capacity,
            idle_timeout: self.idle_timeout,
        }))
    }
}
