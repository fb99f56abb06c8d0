use std::sync::Arc;
use tracing::{info, warn};

use crate::chat::{ConversationTurn, build_retrieval_query};
use crate::retrieval::{RetrievalError, Retriever};
use crate::vectordb::{Chunk, DocumentCatalog, IndexedDocument};

/// What one request is grounded in: gated chunks plus the uploaded-document listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Evidence {
    pub chunks: Vec<Chunk>,
    pub documents: Vec<IndexedDocument>,
}

/// Gathers document evidence for a question, degrading to none when nothing qualifies.
#[derive(Clone, Default)]
pub struct EvidenceSource {
    retriever: Option<Arc<dyn Retriever>>,
    catalog: Option<Arc<dyn DocumentCatalog>>,
}

impl EvidenceSource {
    pub fn new(retriever: Arc<dyn Retriever>) -> Self {
        Self {
            retriever: Some(retriever),
            catalog: None,
        }
    }

    /// No retrieval backend; every question is answered without evidence.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Lists indexed documents in every prompt.
    pub fn with_catalog(mut self, catalog: Arc<dyn DocumentCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.retriever.is_some()
    }

    /// Lists documents once, then retrieves chunks for the question and its recent history.
    pub async fn gather(
        &self,
        question: &str,
        history: &[ConversationTurn],
    ) -> Result<Evidence, RetrievalError> {
        let documents = match &self.catalog {
            Some(catalog) => catalog.list_documents().await.map_err(|e| {
                warn!(error = %e, "Document listing failed");
                RetrievalError::from(e)
            })?,
            None => Vec::new(),
        };

        let chunks = self.chunks(question, history).await?;
        info!(
            chunk_count = chunks.len(),
            document_count = documents.len(),
            "Evidence gathered"
        );
        Ok(Evidence { chunks, documents })
    }

    async fn chunks(
        &self,
        question: &str,
        history: &[ConversationTurn],
    ) -> Result<Vec<Chunk>, RetrievalError> {
        let Some(retriever) = &self.retriever else {
            return Ok(Vec::new());
        };

        let query = build_retrieval_query(question, history);
        match retriever.retrieve(&query).await {
            Ok(chunks) => Ok(chunks),
            Err(e) if e.is_no_evidence() => {
                info!(reason = %e, "No document evidence");
                Ok(Vec::new())
            }
            Err(e) => {
                warn!(error = %e, "Evidence retrieval failed");
                Err(e)
            }
        }
    }
}
