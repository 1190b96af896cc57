use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;
use verdict_common::types::ClientMessage;

use crate::ws::registry::ConnectionRegistry;
use crate::AppState;

/// HTTP handler that upgrades the connection to WebSocket.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state.registry.clone()))
}

/// Manage a single WebSocket connection after upgrade.
///
/// The connection is inert until it sends a `register` message; only then
/// does it enter the registry and become eligible for routed results.
/// Malformed inbound messages are discarded and logged, the connection
/// stays open for subsequent valid messages.
async fn handle_socket(socket: WebSocket, registry: Arc<ConnectionRegistry>) {
    let conn_id = Uuid::new_v4();
    info!(conn_id = %conn_id, "WebSocket connected");

    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();

    // Sender task: forward routed messages to the WebSocket sink.
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sink.send(msg).await.is_err() {
                debug!(conn_id = %conn_id, "WebSocket sink closed");
                break;
            }
        }
    });

    // Receiver loop: process inbound messages.
    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(ClientMessage::Register {
                    identity,
                    display_name,
                }) => {
                    info!(
                        conn_id = %conn_id,
                        identity = %identity,
                        display_name = %display_name,
                        "Connection registered"
                    );
                    registry
                        .register(identity, display_name, conn_id, tx.clone())
                        .await;
                }
                Err(e) => {
                    // Discard the one offending message, keep the connection.
                    warn!(conn_id = %conn_id, error = %e, "Malformed message discarded");
                }
            },
            Ok(Message::Close(_)) => break,
            Ok(Message::Binary(_)) => {
                // Registration is text-only; the frame is dropped, the
                // connection stays open.
                warn!(conn_id = %conn_id, "Binary frame discarded");
            }
            Ok(_) => {}
            Err(e) => {
                debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    // Transport-level close: purge this connection's entry, never a newer
    // one that reused the identity.
    registry.unregister(conn_id).await;
    send_task.abort();
    info!(conn_id = %conn_id, "WebSocket disconnected");
}
