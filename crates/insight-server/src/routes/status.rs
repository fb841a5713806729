//! Operational status.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/status", get(get_status))
}

#[derive(Serialize)]
struct StatusResponse {
    running: bool,
    port: u16,
    /// Currently-open observer channels.
    channels: usize,
    #[serde(rename = "backendUrl")]
    backend_url: String,
    #[serde(rename = "lastAnalysisAt", skip_serializing_if = "Option::is_none")]
    last_analysis_at: Option<i64>,
}

async fn get_status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let last_analysis_at = state
        .store
        .snapshot()
        .ok()
        .and_then(|s| s.last_analysis_at);

    Json(StatusResponse {
        running: true,
        port: state.config.port,
        channels: state.relay.registry().len(),
        backend_url: state.config.backend_url.clone(),
        last_analysis_at,
    })
}
