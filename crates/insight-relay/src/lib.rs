//! Insight Relay — the background relay between capture surfaces and the
//! analysis backend.
//!
//! One `Relay` instance lives for the whole process. Each selection it accepts
//! runs one cycle: persist + echo the selection to every observer, dispatch
//! one bounded analysis call, broadcast the outcome. Cycles overlap freely —
//! a hung backend call never blocks newly arriving selections.

pub mod dispatcher;
pub mod registry;
pub mod relay;
pub mod router;

pub use dispatcher::{AnalysisDispatcher, BACKEND_UNAVAILABLE_MSG};
pub use registry::{ChannelSender, ConnectionRegistry};
pub use relay::Relay;
pub use router::BroadcastRouter;
