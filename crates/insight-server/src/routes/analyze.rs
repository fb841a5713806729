//! Built-in analysis backend — the default target of the dispatcher.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use insight_protocol::AnalysisResult;
use serde::Deserialize;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub text: String,
}

/// `POST /analyze` — always answers with a result; heuristics plus optional
/// local-model enrichment.
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalyzeRequest>,
) -> Json<AnalysisResult> {
    let result = insight_analyze::analyze(&state.http_client, &state.ollama, &req.text).await;
    Json(result)
}
