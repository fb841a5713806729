//! WebSocket channel attach — the persistent duplex connection between a
//! content/UI surface and the relay.
//!
//! Each open socket is one registered channel: inbound frames carry
//! `TEXT_SELECTED` captures into the relay; outbound frames carry every
//! broadcast outcome. Closing the socket (or a failed delivery) removes the
//! channel from the registry; it is never reused.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use insight_protocol::CaptureMessage;
use tokio::sync::mpsc;
use tracing::debug;

use crate::state::AppState;

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let channel_name = uuid::Uuid::new_v4().to_string();
    let (tx, mut rx) = mpsc::unbounded_channel();
    state.relay.registry().register(&channel_name, tx);

    let (mut sink, mut stream) = socket.split();

    // Writer: forward broadcast outcomes to this channel's socket. Exiting
    // drops the receiver, which makes the registry prune this channel on its
    // next delivery.
    let writer = tokio::spawn(async move {
        while let Some(outcome) = rx.recv().await {
            let Ok(json) = serde_json::to_string(&outcome) else {
                continue;
            };
            if sink.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    // Reader: captures coming in over this channel.
    while let Some(Ok(message)) = stream.next().await {
        match message {
            Message::Text(text) => match serde_json::from_str::<CaptureMessage>(text.as_str()) {
                Ok(CaptureMessage::TextSelected(selection)) => state.relay.accept(selection),
                Err(e) => debug!("Ignoring malformed frame on {}: {}", channel_name, e),
            },
            Message::Close(_) => break,
            _ => {}
        }
    }

    // Explicit close notification path.
    state.relay.registry().unregister(&channel_name);
    writer.abort();
}
