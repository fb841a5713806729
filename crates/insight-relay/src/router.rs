//! Broadcast router — fans one outcome out to snapshot, channels, and the
//! ephemeral broadcast.

use std::sync::Arc;

use insight_protocol::Outcome;
use insight_snapshot::SnapshotStore;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::registry::ConnectionRegistry;

/// Buffer for the ephemeral broadcast. Observers that lag past this simply
/// miss events and re-hydrate from the snapshot.
const EPHEMERAL_BUFFER: usize = 64;

/// Routes each outcome to three destinations, each best-effort and
/// independently fault-tolerant: the durable snapshot, every registered
/// channel, and a fire-and-forget broadcast for observers without a channel.
pub struct BroadcastRouter {
    registry: Arc<ConnectionRegistry>,
    store: Arc<SnapshotStore>,
    ephemeral: broadcast::Sender<Outcome>,
}

impl BroadcastRouter {
    pub fn new(registry: Arc<ConnectionRegistry>, store: Arc<SnapshotStore>) -> Self {
        let (ephemeral, _) = broadcast::channel(EPHEMERAL_BUFFER);
        Self {
            registry,
            store,
            ephemeral,
        }
    }

    /// Attach an ephemeral observer. Dropping the receiver is the only
    /// detach; no registration is involved.
    pub fn subscribe(&self) -> broadcast::Receiver<Outcome> {
        self.ephemeral.subscribe()
    }

    /// Publish one outcome. A failure in any destination is logged and does
    /// not affect the others.
    pub fn publish(&self, outcome: Outcome) {
        // (a) Durable snapshot write.
        let write = match &outcome {
            Outcome::SelectionUpdated(sel) => self.store.set_last_selection(sel),
            Outcome::AnalysisResult(result) => self.store.record_analysis_result(result),
            Outcome::AnalysisError(err) => self.store.record_analysis_error(err),
        };
        if let Err(e) = write {
            warn!("Snapshot write failed for {}: {}", outcome.kind(), e);
        }

        // (b) Every registered channel, pruning dead ones.
        let delivered = self.registry.broadcast(&outcome);
        debug!(
            "Broadcast {} to {} channel(s)",
            outcome.kind(),
            delivered
        );

        // (c) Ephemeral broadcast. "No listener" is expected, not an error.
        let _ = self.ephemeral.send(outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insight_protocol::{AnalysisError, AnalysisResult, Selection};
    use tokio::sync::mpsc;

    fn make_router() -> (BroadcastRouter, Arc<ConnectionRegistry>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(SnapshotStore::open(dir.path()).unwrap());
        let registry = Arc::new(ConnectionRegistry::new());
        let router = BroadcastRouter::new(registry.clone(), store);
        (router, registry, dir)
    }

    fn selection(text: &str) -> Selection {
        Selection {
            text: text.into(),
            url: "http://a".into(),
            title: "A".into(),
            timestamp: 1,
        }
    }

    #[test]
    fn test_publish_with_no_listeners_is_fine() {
        let (router, _registry, _dir) = make_router();
        router.publish(Outcome::SelectionUpdated(selection("hello")));
    }

    #[test]
    fn test_publish_reaches_channels_and_snapshot() {
        let (router, registry, _dir) = make_router();
        let (tx, mut rx) = mpsc::unbounded_channel();
        registry.register("panel", tx);

        router.publish(Outcome::SelectionUpdated(selection("hello")));

        let event = rx.try_recv().unwrap();
        assert_eq!(event.kind(), "SELECTION_UPDATED");
    }

    #[test]
    fn test_analysis_outcomes_are_mutually_exclusive_in_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(SnapshotStore::open(dir.path()).unwrap());
        let registry = Arc::new(ConnectionRegistry::new());
        let router = BroadcastRouter::new(registry, store.clone());

        router.publish(Outcome::AnalysisResult(AnalysisResult {
            summary: "S".into(),
            insights: vec![],
        }));
        let snap = store.snapshot().unwrap();
        assert!(snap.last_analysis.is_some());
        assert!(snap.last_analysis_error.is_none());

        router.publish(Outcome::AnalysisError(AnalysisError {
            message: "down".into(),
        }));
        let snap = store.snapshot().unwrap();
        assert!(snap.last_analysis.is_none());
        assert!(snap.last_analysis_error.is_some());
    }

    #[tokio::test]
    async fn test_ephemeral_subscriber_receives() {
        let (router, _registry, _dir) = make_router();
        let mut rx = router.subscribe();

        router.publish(Outcome::SelectionUpdated(selection("hello")));

        let event = rx.recv().await.unwrap();
        assert_eq!(event.kind(), "SELECTION_UPDATED");
    }
}
