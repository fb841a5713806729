//! The singleton capture channel — an explicit three-state connection handle.

use futures::SinkExt;
use insight_core::{Error, Result};
use insight_protocol::CaptureMessage;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Connection lifecycle. A connection that fails a send transitions to
/// `Disconnected` exactly once and is never reused; the next send attempt
/// creates a fresh one.
enum ConnectionState {
    Disconnected,
    Connecting,
    Connected(Box<WsStream>),
}

impl ConnectionState {
    fn name(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected(_) => "connected",
        }
    }
}

/// One reconnecting WebSocket channel from a capture surface to the relay.
/// Created lazily on the first send attempt.
pub struct SelectionChannel {
    url: String,
    state: ConnectionState,
}

impl SelectionChannel {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            state: ConnectionState::Disconnected,
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.state, ConnectionState::Connected(_))
    }

    /// Current state, for logs and tests.
    pub fn state_name(&self) -> &'static str {
        self.state.name()
    }

    /// Explicit close notification from the channel's owner: drop the stale
    /// stream so the next send reconnects.
    pub fn mark_closed(&mut self) {
        if self.is_connected() {
            debug!("Capture channel closed");
        }
        self.state = ConnectionState::Disconnected;
    }

    /// Send one capture message, connecting first if needed. On failure the
    /// handle transitions to `Disconnected`; the caller decides whether to
    /// retry.
    pub async fn send(&mut self, message: &CaptureMessage) -> Result<()> {
        self.ensure_connected().await?;

        let ConnectionState::Connected(stream) = &mut self.state else {
            return Err(Error::Channel("not connected".to_string()));
        };

        let json = serde_json::to_string(message)?;
        if let Err(e) = stream.send(Message::Text(json)).await {
            self.state = ConnectionState::Disconnected;
            return Err(Error::Channel(format!("send failed: {}", e)));
        }
        Ok(())
    }

    async fn ensure_connected(&mut self) -> Result<()> {
        if self.is_connected() {
            return Ok(());
        }

        self.state = ConnectionState::Connecting;
        match connect_async(self.url.as_str()).await {
            Ok((stream, _)) => {
                info!("Capture channel connected to {}", self.url);
                self.state = ConnectionState::Connected(Box::new(stream));
                Ok(())
            }
            Err(e) => {
                self.state = ConnectionState::Disconnected;
                Err(Error::Channel(format!(
                    "connect to {} failed: {}",
                    self.url, e
                )))
            }
        }
    }
}
