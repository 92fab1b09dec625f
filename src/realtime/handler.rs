//! WebSocket endpoint
//!
//! - GET /ws — upgrade to a chat session

use crate::assistant::Assistant;
use crate::realtime::registry::{ConnectionId, ConnectionRegistry};
use crate::realtime::session::Session;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use futures::{future, SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Shared state for the WebSocket endpoint
#[derive(Clone)]
pub struct RealtimeState {
    pub registry: Arc<ConnectionRegistry>,
    pub assistant: Arc<Assistant>,
    pub keepalive: Duration,
}

/// Create the realtime router
pub fn realtime_router(state: RealtimeState) -> Router {
    Router::new()
        .route("/ws", get(ws_upgrade))
        .with_state(state)
}

/// WebSocket upgrade handler
async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<RealtimeState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Run one connection: a writer task drains the outbound queue into the
/// socket while the session consumes inbound text frames.
async fn handle_socket(socket: WebSocket, state: RealtimeState) {
    let id = ConnectionId::new();
    tracing::info!(connection_id = %id, "WebSocket connected");

    let (mut ws_sender, ws_receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if ws_sender.send(Message::Text(msg)).await.is_err() {
                tracing::debug!(connection_id = %id, "WebSocket send failed");
                break;
            }
        }
    });

    // Close frames and transport errors end the stream; non-text frames are skipped.
    let frames = ws_receiver
        .take_while(|msg| future::ready(matches!(msg, Ok(m) if !matches!(m, Message::Close(_)))))
        .filter_map(|msg| {
            future::ready(match msg {
                Ok(Message::Text(text)) => Some(text),
                _ => None,
            })
        });

    let session = Session::new(
        id,
        state.registry.clone(),
        state.assistant.clone(),
        state.keepalive,
    );
    let mut session_task = tokio::spawn(session.run(tx, Box::pin(frames)));

    tokio::select! {
        _ = &mut send_task => session_task.abort(),
        _ = &mut session_task => send_task.abort(),
    }

    state.registry.remove(id).await;
    tracing::info!(connection_id = %id, "WebSocket disconnected");
}
