//! Insight Core — configuration and error types shared across the relay.

pub mod config;
pub mod error;

pub use config::{DataPaths, InsightConfig};
pub use error::{Error, Result};
