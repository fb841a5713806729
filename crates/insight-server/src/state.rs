//! Shared application state.

use std::sync::Arc;

use insight_analyze::OllamaConfig;
use insight_core::InsightConfig;
use insight_relay::{AnalysisDispatcher, Relay};
use insight_snapshot::SnapshotStore;

/// Shared application state accessible from all route handlers.
pub struct AppState {
    pub config: InsightConfig,
    pub store: Arc<SnapshotStore>,
    pub relay: Relay,
    /// Shared client for the built-in analyzer's Ollama calls.
    pub http_client: reqwest::Client,
    pub ollama: OllamaConfig,
}

impl AppState {
    pub fn new(config: InsightConfig, store: Arc<SnapshotStore>) -> Self {
        let dispatcher =
            AnalysisDispatcher::new(config.backend_url.clone(), config.analysis_timeout);
        let relay = Relay::new(store.clone(), dispatcher);

        Self {
            config,
            store,
            relay,
            http_client: reqwest::Client::new(),
            ollama: OllamaConfig::from_env(),
        }
    }
}
