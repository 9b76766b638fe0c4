//! WebSocket endpoint for chat clients.
//!
//! Message routing lives behind this endpoint; the gate only admits the
//! upgrade. Until a router is attached the socket echoes text frames.

use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    response::IntoResponse,
    Extension,
};
use tracing::debug;
use uuid::Uuid;

use crate::gate::RequestContext;

/// GET /ws/chat
pub async fn chat_socket(
    ws: WebSocketUpgrade,
    Extension(ctx): Extension<RequestContext>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, ctx.request_id))
}

async fn handle_socket(mut socket: WebSocket, request_id: Uuid) {
    debug!(%request_id, "WebSocket connection opened");

    while let Some(msg) = socket.recv().await {
        match msg {
            Ok(Message::Text(text)) => {
                if socket.send(Message::Text(text)).await.is_err() {
                    debug!(%request_id, "Failed to send frame, client disconnected");
                    break;
                }
            }
            Ok(Message::Close(_)) => break,
            // Pings are answered by the protocol layer; binary and pong frames are ignored
            Ok(_) => {}
            Err(e) => {
                debug!(%request_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    debug!(%request_id, "WebSocket connection closed");
}
