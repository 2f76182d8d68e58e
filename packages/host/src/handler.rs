//! WebSocket and HTTP handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
};
use duet_shared::envelope::Command;
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::domain::Connection;

use super::state::{AppState, ConnectQuery};

fn default_username(session_id: &str) -> String {
    format!("user-{}", session_id.get(..4).unwrap_or(session_id))
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    let session_id = Uuid::new_v4().to_string();
    let username = query
        .username
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| default_username(&session_id));

    // Create a channel for this connection to receive envelopes
    let (tx, rx) = mpsc::unbounded_channel();

    {
        let mut registry = state.registry.lock().await;
        if registry.is_username_taken(&username) {
            tracing::warn!(
                "Username '{}' is already connected. Rejecting connection.",
                username
            );
            return Err(StatusCode::CONFLICT);
        }
        registry.connect(&session_id, &username);
        state.clients.lock().await.insert(session_id.clone(), tx);
    }

    tracing::info!("'{}' connected as {}", username, session_id);

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, session_id, rx)))
}

pub async fn handle_socket(
    socket: WebSocket,
    state: Arc<AppState>,
    session_id: String,
    mut rx: mpsc::UnboundedReceiver<String>,
) {
    let (mut sender, mut receiver) = socket.split();

    let recv_state = Arc::clone(&state);
    let recv_session_id = session_id.clone();

    // Spawn a task to apply commands from this connection
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::error!("WebSocket error: {}", e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    let command = match Command::decode(&text) {
                        Ok(command) => command,
                        Err(e) => {
                            tracing::warn!("Ignoring frame from '{}': {}", recv_session_id, e);
                            continue;
                        }
                    };
                    tracing::debug!("'{}' sent {}", recv_session_id, command.tag());

                    let mut registry = recv_state.registry.lock().await;
                    let deliveries = registry.handle(&recv_session_id, command);
                    recv_state.deliver(deliveries).await;
                }
                Message::Close(_) => {
                    tracing::info!("'{}' requested close", recv_session_id);
                    break;
                }
                _ => {}
            }
        }
    });

    // Spawn a task to forward queued envelopes to this connection
    let mut send_task = tokio::spawn(async move {
        while let Some(text) = rx.recv().await {
            if sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    let mut registry = state.registry.lock().await;
    state.clients.lock().await.remove(&session_id);
    let deliveries = registry.disconnect(&session_id);
    state.deliver(deliveries).await;
    tracing::info!("'{}' disconnected and removed from registry", session_id);
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Host and guests of the current session, in admission order
pub async fn list_members(State(state): State<Arc<AppState>>) -> Json<Vec<Connection>> {
    let registry = state.registry.lock().await;
    Json(registry.members())
}
