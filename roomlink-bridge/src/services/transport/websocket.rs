use axum::Router;
use axum::extract::ws::{Message as WsMessage, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::sync::mpsc;

use crate::services::{Session, SessionContext};

pub const LIVENESS_TEXT: &str = "Hotel Controller Bridge is running";

pub fn websocket_router(context: SessionContext) -> Router {
    Router::new()
        .route("/", get(ws_handler))
        .with_state(context)
}

/// Upgrades to a bridge session, or answers a plain request with a short
/// liveness text.
async fn ws_handler(
    ws: Option<WebSocketUpgrade>,
    State(context): State<SessionContext>,
) -> Response {
    match ws {
        Some(ws) => ws
            .on_upgrade(move |socket| handle_websocket(socket, context))
            .into_response(),
        None => LIVENESS_TEXT.into_response(),
    }
}

async fn handle_websocket(socket: WebSocket, context: SessionContext) {
    let (mut sender, mut receiver) = socket.split();
    let (inbound_tx, inbound_rx) = mpsc::unbounded_channel::<String>();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Value>();

    let session = Session::new(context, outbound_tx);
    let session_id = session.id().to_string();

    tracing::info!("WebSocket client {} connected", session_id);

    let session_task = tokio::spawn(session.run(inbound_rx));

    let session_id_send = session_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(value) = outbound_rx.recv().await {
            if sender.send(WsMessage::Text(value.to_string())).await.is_err() {
                break;
            }
        }
        tracing::info!("WebSocket client {} send task ended", session_id_send);
    });

    while let Some(result) = receiver.next().await {
        let text = match result {
            Ok(WsMessage::Text(text)) => text,
            Ok(WsMessage::Binary(data)) => String::from_utf8_lossy(&data).into_owned(),
            Ok(WsMessage::Close(_)) => {
                tracing::info!("WebSocket client {} closed", session_id);
                break;
            }
            Err(e) => {
                tracing::warn!("WebSocket error for client {}: {}", session_id, e);
                break;
            }
            _ => continue,
        };

        if inbound_tx.send(text).is_err() {
            break;
        }
    }

    // Closing the inbound channel ends the session, which tears down its
    // controller link and timers.
    drop(inbound_tx);
    if let Err(e) = session_task.await {
        tracing::warn!("Session {} ended abnormally: {}", session_id, e);
    }
    send_task.abort();

    tracing::info!("WebSocket client {} disconnected", session_id);
}
