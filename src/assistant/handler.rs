//! HTTP handlers for the chat assistant
//!
//! - POST /api/chat         — chat over HTTP (same path as the WebSocket chat branch)
//! - GET  /api/test-openai  — provider round-trip latency diagnostic

use crate::assistant::engine::{Assistant, ChatOutcome};
use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

/// Shared state for assistant handlers
#[derive(Clone)]
pub struct AssistantState {
    pub assistant: Arc<Assistant>,
}

/// Create the assistant router
pub fn assistant_router(state: AssistantState) -> Router {
    Router::new()
        .route("/api/chat", post(chat))
        .route("/api/test-openai", get(test_openai))
        .with_state(state)
}

/// Chat request body
#[derive(Debug, Deserialize)]
struct ChatRequest {
    #[serde(default)]
    text: String,
}

/// POST /api/chat
async fn chat(
    State(state): State<AssistantState>,
    Json(request): Json<ChatRequest>,
) -> impl IntoResponse {
    let text = request.text.trim();
    if text.is_empty() {
        return Json(json!({"response": "Messaggio vuoto ricevuto"}));
    }

    match state.assistant.respond(text).await {
        ChatOutcome::Reply(reply) => Json(json!({"response": reply})),
        ChatOutcome::Quota(signal) => Json(json!(signal)),
    }
}

/// GET /api/test-openai
async fn test_openai(State(state): State<AssistantState>) -> impl IntoResponse {
    Json(state.assistant.diagnose().await)
}
