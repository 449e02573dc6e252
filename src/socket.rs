//! WebSocket endpoint the browser extension connects to.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::{
    api::ConnectorState,
    bridge::{Bridge, PeerHandle},
    error::BridgeError,
    protocol::OutboundMessage,
};

pub const EXTENSION_WS_PATH: &str = "/extension-ws";

pub async fn extension_ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<ConnectorState>,
) -> impl IntoResponse {
    let bridge = state.bridge.clone();
    // Screenshot frames carry the whole image, so they share the HTTP body limit.
    ws.max_frame_size(state.max_body_bytes)
        .max_message_size(state.max_body_bytes)
        .on_upgrade(move |socket| handle_extension_socket(socket, bridge))
}

async fn handle_extension_socket(socket: WebSocket, bridge: Arc<Bridge>) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<OutboundMessage>();

    let peer = PeerHandle::new(bridge.peers().next_connection_id(), tx);
    let connection_id = peer.id();
    bridge.peers().attach(peer.clone());

    let sender_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match msg.to_json() {
                Ok(json) => {
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                Err(e) => error!("Failed to encode outbound frame: {}", e),
            }
        }
    });

    while let Some(result) = receiver.next().await {
        match result {
            Ok(Message::Text(text)) => match bridge.handle_frame(&peer, text.as_str()).await {
                Ok(outcome) => debug!("Connection {}: {:?}", connection_id, outcome),
                Err(BridgeError::Malformed(e)) => {
                    warn!("Ignoring malformed frame on connection {}: {}", connection_id, e)
                }
                Err(e) => error!("Error processing extension frame: {}", e),
            },
            Ok(Message::Close(_)) => {
                info!("Extension closed connection {}", connection_id);
                break;
            }
            Ok(Message::Binary(_)) => {
                warn!("Ignoring binary frame on connection {}", connection_id);
            }
            Ok(_) => {}
            Err(e) => {
                warn!("WebSocket error on connection {}: {}", connection_id, e);
                break;
            }
        }
    }

    // Dropping the writer closes the channel, so later sends to this peer fail fast.
    sender_task.abort();
    bridge.peers().detach(connection_id);
}
