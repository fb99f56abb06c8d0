use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

use super::error::ServiceError;
use super::evidence::EvidenceSource;
use crate::compare::{CompareError, CompareRequest, CompareStream, ComparisonOrchestrator, Side};
use crate::provider::ProviderRouter;

/// Fair side-by-side comparison: one retrieval, one prompt, two backends.
#[derive(Clone)]
pub struct BattlegroundService {
    router: Arc<ProviderRouter>,
    evidence: EvidenceSource,
    orchestrator: ComparisonOrchestrator,
}

impl BattlegroundService {
    pub fn new(router: Arc<ProviderRouter>, evidence: EvidenceSource) -> Self {
        let orchestrator = ComparisonOrchestrator::new(router.clone());
        Self {
            router,
            evidence,
            orchestrator,
        }
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.orchestrator = self.orchestrator.with_queue_capacity(capacity);
        self
    }

    pub fn with_idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.orchestrator = self.orchestrator.with_idle_timeout(timeout);
        self
    }

    pub fn router(&self) -> &ProviderRouter {
        &self.router
    }

    /// Validates, checks both selections against the allowlist, retrieves evidence
    /// once and returns the (not yet started) comparison stream.
    #[instrument(skip_all, fields(side_a = %request.side_a, side_b = %request.side_b))]
    pub async fn compare_stream(
        &self,
        request: &CompareRequest,
    ) -> Result<CompareStream, ServiceError> {
        ComparisonOrchestrator::validate(request)?;

        for side in Side::BOTH {
            let selection = request.selection(side);
            self.router
                .ensure_allowed(&selection.backend_id, &selection.model)
                .map_err(|source| CompareError::SelectionNotAllowed { side, source })?;
        }

        let evidence = self
            .evidence
            .gather(request.question.trim(), &request.history)
            .await?;

        Ok(self
            .orchestrator
            .compare_grounded(request, &evidence.chunks, &evidence.documents)?)
    }
}
