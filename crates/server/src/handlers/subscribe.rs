//! Live update channel
//!
//! One WebSocket per client; every persisted clip or file record is pushed
//! as a JSON text frame. The socket takes no token: the channel is a public
//! broadcast by policy, and it accepts no client commands.

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use crate::config::AppState;

/// GET /ws
pub async fn ws_subscribe(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    info!("[Realtime] Subscriber connected");

    let mut rx = state.share.subscribe();
    let (mut sender, mut receiver) = socket.split();

    loop {
        tokio::select! {
            event = rx.recv() => {
                match event {
                    Ok(event) => {
                        let frame = match serde_json::to_string(&event) {
                            Ok(json) => json,
                            Err(e) => {
                                warn!("[Realtime] Failed to encode event: {}", e);
                                continue;
                            }
                        };
                        if sender.send(Message::Text(frame.into())).await.is_err() {
                            break;
                        }
                    }
                    // A slow client dropped events; keep going with the next
                    // one rather than closing on it.
                    Err(RecvError::Lagged(n)) => {
                        warn!("[Realtime] Subscriber lagged by {} events", n);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            msg = receiver.next() => {
                match msg {
                    // No client-to-server frames are defined; the read half
                    // only notices the close.
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    info!("[Realtime] Subscriber disconnected");
}
