//! Connection registry — the set of currently-open observer channels.

use std::collections::HashMap;

use insight_protocol::Outcome;
use parking_lot::RwLock;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Sender half of one registered channel. The receiver half lives with the
/// socket task that owns the connection.
pub type ChannelSender = mpsc::UnboundedSender<Outcome>;

/// Registry of live channels, keyed by an opaque channel name.
///
/// The registry is the only writer of the channel set; the map itself is never
/// exposed. Membership only ever shrinks via explicit unregister or a failed
/// delivery, never by timeout.
#[derive(Default)]
pub struct ConnectionRegistry {
    channels: RwLock<HashMap<String, ChannelSender>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a channel to the live set.
    pub fn register(&self, name: impl Into<String>, sender: ChannelSender) {
        let name = name.into();
        self.channels.write().insert(name.clone(), sender);
        info!("Channel registered: {}", name);
    }

    /// Remove a channel on explicit close notification.
    pub fn unregister(&self, name: &str) -> bool {
        let removed = self.channels.write().remove(name).is_some();
        if removed {
            info!("Channel unregistered: {}", name);
        }
        removed
    }

    /// Deliver an outcome to every member, pruning any member whose delivery
    /// fails (receiver dropped — a dead channel). Pruning is synchronous and a
    /// side effect of delivery; a failure on one member never prevents
    /// delivery to the rest. Returns the number of successful deliveries.
    pub fn broadcast(&self, outcome: &Outcome) -> usize {
        let mut channels = self.channels.write();
        let mut delivered = 0;

        channels.retain(|name, sender| match sender.send(outcome.clone()) {
            Ok(()) => {
                delivered += 1;
                true
            }
            Err(_) => {
                debug!("Pruning dead channel: {}", name);
                false
            }
        });

        delivered
    }

    /// Number of currently-open channels.
    pub fn len(&self) -> usize {
        self.channels.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.read().is_empty()
    }
}
