use axum::{
    Json,
    body::{Body, Bytes},
    extract::State,
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
};
use futures_util::StreamExt;
use serde::de::DeserializeOwned;
use tracing::{info, instrument};

use crate::gateway::error::GatewayError;
use crate::gateway::payload::{ChatPayload, ComparePayload, ModelsResponse};
use crate::gateway::state::HandlerState;
use crate::service::{ChatAnswer, ServiceError};

pub const NDJSON_CONTENT_TYPE: &str = "application/x-ndjson";
pub const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Deserializes a body, turning schema mismatches into 400s instead of axum's 422.
fn parse_payload<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, GatewayError> {
    serde_json::from_value(value)
        .map_err(|e| GatewayError::InvalidRequest(format!("Invalid request schema: {}", e)))
}

fn streaming_response(body: Body, content_type: &'static str) -> Response {
    let mut response = body.into_response();
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

#[instrument(skip(state))]
pub async fn models_handler(State(state): State<HandlerState>) -> Json<ModelsResponse> {
    let models = state.model_options();
    info!(model_count = models.len(), "Listing model options");
    Json(ModelsResponse { models })
}

#[instrument(skip_all)]
pub async fn chat_handler(
    State(state): State<HandlerState>,
    Json(payload): Json<serde_json::Value>,
) -> Result<Json<ChatAnswer>, GatewayError> {
    let payload: ChatPayload = parse_payload(payload)?;
    info!(
        message_length = payload.message.len(),
        history_turns = payload.history.len(),
        backend_id = %payload.backend_id,
        model = %payload.model,
        "Chat requested"
    );

    let request = payload.into_request().map_err(ServiceError::from)?;
    let answer = state.chat.answer(&request).await?;
    Ok(Json(answer))
}

#[instrument(skip_all)]
pub async fn chat_stream_handler(
    State(state): State<HandlerState>,
    Json(payload): Json<serde_json::Value>,
) -> Result<Response, GatewayError> {
    let payload: ChatPayload = parse_payload(payload)?;
    info!(
        message_length = payload.message.len(),
        history_turns = payload.history.len(),
        backend_id = %payload.backend_id,
        model = %payload.model,
        "Chat stream requested"
    );

    let request = payload.into_request().map_err(ServiceError::from)?;
    let fragments = state.chat.answer_stream(&request).await?;

    let body = fragments
        .filter(|fragment| {
            let keep = !matches!(fragment, Ok(text) if text.is_empty());
            async move { keep }
        })
        .map(|fragment| fragment.map(Bytes::from));

    Ok(streaming_response(Body::from_stream(body), TEXT_CONTENT_TYPE))
}

/// Streams side-tagged comparison events as NDJSON.
///
/// Validation, allowlist and retrieval failures are returned before the body starts.
/// Dropping the body (client disconnect) drops the comparison stream, which aborts
/// both side workers.
#[instrument(skip_all)]
pub async fn compare_stream_handler(
    State(state): State<HandlerState>,
    Json(payload): Json<serde_json::Value>,
) -> Result<Response, GatewayError> {
    let payload: ComparePayload = parse_payload(payload)?;
    info!(
        message_length = payload.message.len(),
        history_turns = payload.history.len(),
        model_a_backend_id = %payload.model_a_backend_id,
        model_a = %payload.model_a,
        model_b_backend_id = %payload.model_b_backend_id,
        model_b = %payload.model_b,
        "Comparison stream requested"
    );

    let request = payload.into_request().map_err(ServiceError::from)?;
    let events = state.battleground.compare_stream(&request).await?;

    let body = events.map(|event| event.to_ndjson_line().map(Bytes::from));

    Ok(streaming_response(Body::from_stream(body), NDJSON_CONTENT_TYPE))
}
