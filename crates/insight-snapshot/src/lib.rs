//! Insight Snapshot — durable last-write-wins state for late-attaching observers.

pub mod keys;
pub mod store;
pub mod types;

pub use store::SnapshotStore;
pub use types::Snapshot;
