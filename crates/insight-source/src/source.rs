//! Selection source — capture entry point on the client side.

use std::time::{Duration, Instant};

use insight_core::Result;
use insight_protocol::{CaptureMessage, Selection};
use tracing::{debug, warn};

use crate::connection::SelectionChannel;
use crate::debounce::Debounce;

/// Window inside which a byte-identical repeat capture is suppressed.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(800);

/// Direct snapshot write for observers that hydrate from storage rather than
/// the live channel. Best-effort; the live send does not depend on it.
pub struct SnapshotFallback {
    client: reqwest::Client,
    url: String,
}

impl SnapshotFallback {
    /// `base_url` is the relay's HTTP address, e.g. `http://127.0.0.1:8000`.
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: format!("{}/api/snapshot/selection", base_url.trim_end_matches('/')),
        }
    }

    async fn record(&self, selection: &Selection) -> Result<()> {
        self.client
            .post(&self.url)
            .json(selection)
            .send()
            .await
            .map_err(|e| insight_core::Error::Storage(e.to_string()))?
            .error_for_status()
            .map_err(|e| insight_core::Error::Storage(e.to_string()))?;
        Ok(())
    }
}

/// Captures selections and forwards them over one reconnecting channel.
///
/// A send that fails (including a connect race straight after lazy creation)
/// clears the stale connection and retries exactly once; the second failure
/// is logged locally and the selection is dropped. Nothing is surfaced to the
/// user.
pub struct SelectionSource {
    channel: SelectionChannel,
    debounce: Debounce,
    fallback: Option<SnapshotFallback>,
}

impl SelectionSource {
    /// `relay_url` is the relay's WebSocket address, e.g. `ws://127.0.0.1:8000/ws`.
    pub fn new(relay_url: impl Into<String>) -> Self {
        Self {
            channel: SelectionChannel::new(relay_url),
            debounce: Debounce::new(DEBOUNCE_WINDOW),
            fallback: None,
        }
    }

    /// Also write each forwarded selection to the relay's snapshot over HTTP.
    pub fn with_snapshot_fallback(mut self, base_url: &str) -> Self {
        self.fallback = Some(SnapshotFallback::new(base_url));
        self
    }

    pub fn is_connected(&self) -> bool {
        self.channel.is_connected()
    }

    /// Handle one qualifying capture event. Empty text is silently dropped;
    /// duplicates inside the debounce window are suppressed.
    pub async fn capture(&mut self, text: &str, url: &str, title: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }

        let now = Instant::now();
        if !self.debounce.admit(text, now) {
            debug!("Suppressed duplicate capture ({} chars)", text.len());
            return;
        }

        let selection = Selection::new(text, url, title);

        if let Some(fallback) = &self.fallback {
            if let Err(e) = fallback.record(&selection).await {
                warn!("Snapshot fallback write failed: {}", e);
            }
        }

        let message = CaptureMessage::TextSelected(selection);
        match self.channel.send(&message).await {
            Ok(()) => self.debounce.record(text, now),
            Err(first) => {
                debug!("Send failed ({}), reconnecting once", first);
                self.channel.mark_closed();
                match self.channel.send(&message).await {
                    Ok(()) => self.debounce.record(text, now),
                    Err(second) => {
                        warn!("Selection dropped after one reconnect attempt: {}", second)
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use tokio::net::TcpListener;
    use tokio::sync::mpsc;

    /// Relay stand-in that collects every received text frame.
    async fn spawn_relay(frames: mpsc::UnboundedSender<String>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            loop {
                let (socket, _) = listener.accept().await.unwrap();
                let frames = frames.clone();
                tokio::spawn(async move {
                    let mut ws = tokio_tungstenite::accept_async(socket).await.unwrap();
                    while let Some(Ok(msg)) = ws.next().await {
                        if let Ok(text) = msg.into_text() {
                            let _ = frames.send(text);
                        }
                    }
                });
            }
        });
        format!("ws://{}", addr)
    }

    #[tokio::test]
    async fn test_capture_forwards_selection() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let url = spawn_relay(tx).await;

        let mut source = SelectionSource::new(url);
        source.capture("hello", "http://a", "A").await;

        let raw = rx.recv().await.unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["type"], "TEXT_SELECTED");
        assert_eq!(json["payload"]["text"], "hello");
        assert_eq!(json["payload"]["title"], "A");
    }

    #[tokio::test]
    async fn test_duplicate_capture_suppressed() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let url = spawn_relay(tx).await;

        let mut source = SelectionSource::new(url);
        // Two identical captures 100 ms apart: only the first is forwarded.
        source.capture("foo", "http://a", "A").await;
        tokio::time::sleep(Duration::from_millis(100)).await;
        source.capture("foo", "http://a", "A").await;

        assert!(rx.recv().await.is_some());
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_empty_capture_dropped() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let url = spawn_relay(tx).await;

        let mut source = SelectionSource::new(url);
        source.capture("   ", "http://a", "A").await;

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(rx.try_recv().is_err());
        // Nothing was sent, so no connection was ever created.
        assert!(!source.is_connected());
    }

    #[tokio::test]
    async fn test_dead_relay_gives_up_quietly() {
        let mut source = SelectionSource::new("ws://127.0.0.1:1");
        // Must complete without panicking or surfacing an error.
        source.capture("hello", "http://a", "A").await;
        assert!(!source.is_connected());

        // The failed text was never recorded as sent, so an immediate retry
        // is not debounced away once the relay is reachable.
        let (tx, mut rx) = mpsc::unbounded_channel();
        let url = spawn_relay(tx).await;
        let mut source = SelectionSource::new(url);
        source.capture("hello", "http://a", "A").await;
        assert!(rx.recv().await.is_some());
    }
}
