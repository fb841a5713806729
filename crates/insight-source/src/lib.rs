//! Insight Source — capture-side client for the relay.
//!
//! Wraps one reconnecting WebSocket channel to the relay, debounces repeated
//! captures, and writes a direct snapshot fallback so observers that hydrate
//! from storage see the selection even if the live send fails.

pub mod connection;
pub mod debounce;
pub mod source;

pub use connection::SelectionChannel;
pub use debounce::Debounce;
pub use source::{SelectionSource, SnapshotFallback, DEBOUNCE_WINDOW};
