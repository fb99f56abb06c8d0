use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use std::collections::HashMap;
use std::sync::Arc;
use tower::ServiceExt;

use crate::constants::NO_DOCUMENT_EVIDENCE;
use crate::gateway::{HandlerState, STATUS_HEADER, create_router_with_state};
use crate::provider::{
    BackendProfile, ChatStreamer, MockChatStreamer, MockScript, ProviderKind, ProviderRouter,
};
use crate::retrieval::MockRetriever;
use crate::service::{BattlegroundService, ChatService, EvidenceSource};
use crate::vectordb::Chunk;

fn profile(backend_id: &str, models: &[&str]) -> BackendProfile {
    BackendProfile {
        backend_id: backend_id.to_string(),
        provider: ProviderKind::OpenRouter,
        models: models.iter().map(|m| m.to_string()).collect(),
        api_key: "key".to_string(),
        base_url: None,
        azure: None,
    }
}

fn app(mock: &MockChatStreamer, evidence: EvidenceSource) -> Router {
    let client: Arc<dyn ChatStreamer> = Arc::new(mock.clone());
    let router = Arc::new(
        ProviderRouter::new(
            vec![profile("primary", &["m1", "m2"]), profile("secondary", &["m3"])],
            HashMap::from([
                ("primary".to_string(), Arc::clone(&client)),
                ("secondary".to_string(), client),
            ]),
        )
        .unwrap(),
    );

    let chat = ChatService::new(router.clone(), evidence.clone());
    let battleground = BattlegroundService::new(router, evidence);
    create_router_with_state(HandlerState::new(chat, battleground))
}

fn revenue_evidence() -> EvidenceSource {
    let chunk = Chunk::new("doc-1", "report.pdf", "1", "Revenue was 20 in Q1.", 0.9).unwrap();
    EvidenceSource::new(Arc::new(MockRetriever::new(vec![chunk])))
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn compare_body(a: (&str, &str), b: (&str, &str)) -> serde_json::Value {
    serde_json::json!({
        "message": "What was revenue?",
        "history": [{"role": "user", "message": "Hi"}],
        "model_a_backend_id": a.0,
        "model_a": a.1,
        "model_b_backend_id": b.0,
        "model_b": b.1,
    })
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn error_body(response: axum::response::Response) -> serde_json::Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}

#[tokio::test]
async fn test_health() {
    let response = app(&MockChatStreamer::new(), EvidenceSource::disabled())
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[STATUS_HEADER], "healthy");
    assert_eq!(body_string(response).await, r#"{"status":"ok"}"#);
}

#[tokio::test]
async fn test_models_lists_every_backend_model() {
    let response = app(&MockChatStreamer::new(), EvidenceSource::disabled())
        .oneshot(Request::get("/models").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    let models = json["models"].as_array().unwrap();
    assert_eq!(models.len(), 3);
    assert_eq!(models[0]["backend_id"], "primary");
    assert_eq!(models[0]["provider"], "openrouter");
    assert_eq!(models[0]["model"], "m1");
    assert_eq!(models[2]["label"], "secondary (openrouter) · m3");
}

#[tokio::test]
async fn test_compare_stream_emits_ndjson_with_two_terminals() {
    let mock = MockChatStreamer::new()
        .with_script("primary", "m1", MockScript::fragments(["A1", "A2"]))
        .with_script("secondary", "m3", MockScript::fail_after(["B1"], "boom"));

    let response = app(&mock, revenue_evidence())
        .oneshot(post_json(
            "/battleground/compare/stream",
            compare_body(("primary", "m1"), ("secondary", "m3")),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/x-ndjson"
    );

    let body = body_string(response).await;
    let events: Vec<serde_json::Value> = body
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    let a_chunks: Vec<&str> = events
        .iter()
        .filter(|e| e["side"] == "A" && e.get("chunk").is_some())
        .map(|e| e["chunk"].as_str().unwrap())
        .collect();
    assert_eq!(a_chunks, vec!["A1", "A2"]);
    assert!(events.contains(&serde_json::json!({"side": "A", "done": true})));
    assert!(
        events
            .iter()
            .any(|e| e["side"] == "B" && e["error"].as_str().is_some_and(|m| m.contains("boom")))
    );
    assert!(!events.contains(&serde_json::json!({"side": "B", "done": true})));
}

#[tokio::test]
async fn test_compare_stream_rejects_identical_sides_with_400() {
    let mock = MockChatStreamer::new();
    let response = app(&mock, EvidenceSource::disabled())
        .oneshot(post_json(
            "/battleground/compare/stream",
            compare_body(("primary", " m1 "), ("primary", "m1")),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.headers()[STATUS_HEADER], "invalid_request");
    let json = error_body(response).await;
    assert_eq!(json["error"], "model_a and model_b selections must be different");
    assert_eq!(json["code"], 400);
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn test_compare_stream_rejects_unknown_model_with_400() {
    let response = app(&MockChatStreamer::new(), EvidenceSource::disabled())
        .oneshot(post_json(
            "/battleground/compare/stream",
            compare_body(("primary", "m1"), ("secondary", "m9")),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_compare_stream_rejects_bad_history_role() {
    let mut body = compare_body(("primary", "m1"), ("primary", "m2"));
    body["history"] = serde_json::json!([{"role": "system", "message": "x"}]);

    let response = app(&MockChatStreamer::new(), EvidenceSource::disabled())
        .oneshot(post_json("/battleground/compare/stream", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = error_body(response).await;
    assert!(json["error"].as_str().unwrap().contains("history role"));
}

#[tokio::test]
async fn test_compare_stream_rejects_missing_fields() {
    let response = app(&MockChatStreamer::new(), EvidenceSource::disabled())
        .oneshot(post_json(
            "/battleground/compare/stream",
            serde_json::json!({"message": "hi"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = error_body(response).await;
    assert!(
        json["error"]
            .as_str()
            .unwrap()
            .starts_with("invalid request: Invalid request schema")
    );
}

#[tokio::test]
async fn test_compare_stream_surfaces_retrieval_outage_as_500() {
    let response = app(
        &MockChatStreamer::new(),
        EvidenceSource::new(Arc::new(MockRetriever::unavailable("qdrant down"))),
    )
    .oneshot(post_json(
        "/battleground/compare/stream",
        compare_body(("primary", "m1"), ("primary", "m2")),
    ))
    .await
    .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.headers()[STATUS_HEADER], "retrieval_error");
}

#[tokio::test]
async fn test_chat_returns_grounded_answer() {
    let mock = MockChatStreamer::new().with_script(
        "primary",
        "m1",
        MockScript::fragments(["Revenue was 20 in Q1 [report.pdf #chunk_id=1]"]),
    );

    let response = app(&mock, revenue_evidence())
        .oneshot(post_json(
            "/chat",
            serde_json::json!({
                "message": "What was revenue?",
                "history": [],
                "backend_id": "primary",
                "model": "m1",
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(json["answer"], "Revenue was 20 in Q1");
    assert_eq!(json["grounded"], true);
    assert_eq!(json["retrieved_count"], 1);
    assert_eq!(json["citations"][0]["filename"], "report.pdf");
}

#[tokio::test]
async fn test_chat_without_evidence() {
    let mock = MockChatStreamer::new().with_script(
        "primary",
        "m2",
        MockScript::fragments([NO_DOCUMENT_EVIDENCE]),
    );

    let response = app(&mock, EvidenceSource::disabled())
        .oneshot(post_json(
            "/chat",
            serde_json::json!({"message": "q", "backend_id": "primary", "model": "m2"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(json["answer"], NO_DOCUMENT_EVIDENCE);
    assert_eq!(json["grounded"], false);
}

#[tokio::test]
async fn test_chat_upstream_failure_is_502() {
    let mock = MockChatStreamer::new().with_script(
        "primary",
        "m1",
        MockScript::FailOnStart("503 upstream".to_string()),
    );

    let response = app(&mock, EvidenceSource::disabled())
        .oneshot(post_json(
            "/chat",
            serde_json::json!({"message": "q", "backend_id": "primary", "model": "m1"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(error_body(response).await["code"], 502);
}

#[tokio::test]
async fn test_chat_stream_returns_plain_text() {
    let mock = MockChatStreamer::new().with_script(
        "secondary",
        "m3",
        MockScript::fragments(["Hello", "", " world"]),
    );

    let response = app(&mock, EvidenceSource::disabled())
        .oneshot(post_json(
            "/chat/stream",
            serde_json::json!({"message": "q", "backend_id": "secondary", "model": "m3"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/plain; charset=utf-8"
    );
    assert_eq!(body_string(response).await, "Hello world");
}

#[tokio::test]
async fn test_chat_stream_rejects_blank_question() {
    let mock = MockChatStreamer::new();
    let response = app(&mock, EvidenceSource::disabled())
        .oneshot(post_json(
            "/chat/stream",
            serde_json::json!({"message": "  ", "backend_id": "primary", "model": "m1"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_body(response).await["error"], "question must not be empty");
    assert_eq!(mock.call_count(), 0);
}
