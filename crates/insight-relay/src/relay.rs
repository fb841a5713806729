//! Relay entry point — one cycle per accepted selection.
//!
//! Idle → Persisting → Dispatching → Broadcasting → Idle, long-lived, no
//! terminal state. The persisting and selection-echo steps run synchronously
//! in `accept`; the dispatch runs in its own task, so cycles overlap and a
//! slow backend never delays a newer selection's echo.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use insight_protocol::{Outcome, Selection};
use insight_snapshot::SnapshotStore;
use tokio::sync::broadcast;
use tracing::debug;

use crate::dispatcher::AnalysisDispatcher;
use crate::registry::ConnectionRegistry;
use crate::router::BroadcastRouter;

/// The process-wide relay. Instantiated once at startup and shared behind an
/// `Arc`; the channel set and the snapshot store are mutated only through it.
pub struct Relay {
    registry: Arc<ConnectionRegistry>,
    router: Arc<BroadcastRouter>,
    dispatcher: Arc<AnalysisDispatcher>,
    /// Sequence of the most recently accepted selection. A dispatch whose
    /// sequence is no longer current when it completes is stale and dropped.
    seq: Arc<AtomicU64>,
}

impl Relay {
    pub fn new(store: Arc<SnapshotStore>, dispatcher: AnalysisDispatcher) -> Self {
        let registry = Arc::new(ConnectionRegistry::new());
        let router = Arc::new(BroadcastRouter::new(registry.clone(), store));
        Self {
            registry,
            router,
            dispatcher: Arc::new(dispatcher),
            seq: Arc::new(AtomicU64::new(0)),
        }
    }

    /// The live channel set. Socket handlers register and unregister here.
    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Attach an ephemeral observer (no channel registration).
    pub fn subscribe(&self) -> broadcast::Receiver<Outcome> {
        self.router.subscribe()
    }

    /// Accept one selection: echo it to every observer immediately, then
    /// dispatch one analysis call in the background. Must be called from
    /// within a tokio runtime.
    ///
    /// Empty or whitespace-only text is silently dropped; that is the
    /// source's bug to not send, not an error here.
    pub fn accept(&self, selection: Selection) {
        if selection.text.trim().is_empty() {
            debug!("Dropping empty selection from {}", selection.url);
            return;
        }

        let seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.router
            .publish(Outcome::SelectionUpdated(selection.clone()));

        let router = self.router.clone();
        let dispatcher = self.dispatcher.clone();
        let latest = self.seq.clone();
        tokio::spawn(async move {
            let outcome = dispatcher.dispatch(&selection).await;
            // A newer selection was accepted while this one was in flight;
            // its outcome must not overwrite the newer state.
            if latest.load(Ordering::SeqCst) != seq {
                debug!(
                    "Dropping stale {} for selection seq {}",
                    outcome.kind(),
                    seq
                );
                return;
            }
            router.publish(outcome);
        });
    }
}
