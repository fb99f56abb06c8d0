//! JSON request and response bodies.

use serde::{Deserialize, Serialize};

use crate::chat::{ConversationTurn, HistoryError};
use crate::compare::{CompareRequest, SideSelection};
use crate::provider::ModelOption;
use crate::service::ChatRequest;

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryTurnPayload {
    pub role: String,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatPayload {
    pub message: String,
    #[serde(default)]
    pub history: Vec<HistoryTurnPayload>,
    pub backend_id: String,
    pub model: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ComparePayload {
    pub message: String,
    #[serde(default)]
    pub history: Vec<HistoryTurnPayload>,
    pub model_a_backend_id: String,
    pub model_a: String,
    pub model_b_backend_id: String,
    pub model_b: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelsResponse {
    pub models: Vec<ModelOption>,
}

fn parse_history(turns: Vec<HistoryTurnPayload>) -> Result<Vec<ConversationTurn>, HistoryError> {
    turns
        .into_iter()
        .map(|turn| ConversationTurn::parse(&turn.role, turn.message))
        .collect()
}

impl ChatPayload {
    pub fn into_request(self) -> Result<ChatRequest, HistoryError> {
        Ok(ChatRequest {
            question: self.message,
            history: parse_history(self.history)?,
            backend_id: self.backend_id,
            model: self.model,
        })
    }
}

impl ComparePayload {
    pub fn into_request(self) -> Result<CompareRequest, HistoryError> {
        Ok(CompareRequest::new(
            self.message,
            parse_history(self.history)?,
            SideSelection::new(self.model_a_backend_id, self.model_a),
            SideSelection::new(self.model_b_backend_id, self.model_b),
        ))
    }
}
