//! Shared fixtures for integration tests.

#![allow(dead_code)]

pub mod harness;

use std::collections::HashMap;
use std::sync::Arc;

use battleground::gateway::HandlerState;
use battleground::provider::{BackendProfile, ChatStreamer, ProviderKind, ProviderRouter};
use battleground::service::{BattlegroundService, ChatService, EvidenceSource};
use battleground::vectordb::Chunk;

pub fn profile(backend_id: &str, models: &[&str]) -> BackendProfile {
    BackendProfile {
        backend_id: backend_id.to_string(),
        provider: ProviderKind::OpenRouter,
        models: models.iter().map(|m| m.to_string()).collect(),
        api_key: "test-key".to_string(),
        base_url: None,
        azure: None,
    }
}

/// Router with `primary` (`m1`, `m2`) and `secondary` (`m3`), both served by `client`.
pub fn router(client: Arc<dyn ChatStreamer>) -> Arc<ProviderRouter> {
    let router = ProviderRouter::new(
        vec![profile("primary", &["m1", "m2"]), profile("secondary", &["m3"])],
        HashMap::from([
            ("primary".to_string(), Arc::clone(&client)),
            ("secondary".to_string(), client),
        ]),
    )
    .expect("every profile has a client");
    Arc::new(router)
}

pub fn handler_state(client: Arc<dyn ChatStreamer>, evidence: EvidenceSource) -> HandlerState {
    let router = router(client);
    HandlerState::new(
        ChatService::new(router.clone(), evidence.clone()),
        BattlegroundService::new(router, evidence),
    )
}

pub fn chunk(chunk_id: &str, text: &str, score: f32) -> Chunk {
    Chunk::new("doc-1", "report.pdf", chunk_id, text, score).expect("valid score")
}
