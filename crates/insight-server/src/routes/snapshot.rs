//! Snapshot routes — observer hydration and the source's direct fallback.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use insight_protocol::Selection;
use insight_snapshot::{keys, Snapshot};
use tracing::warn;

use crate::routes::SuccessResponse;
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/snapshot", get(get_snapshot))
        .route("/snapshot/selection", post(put_selection))
        .route("/snapshot/{key}", axum::routing::delete(clear_key))
}

type ApiError = (StatusCode, String);

fn internal(e: impl std::fmt::Display) -> ApiError {
    warn!("Snapshot route error: {}", e);
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

/// Full durable snapshot, read by late-attaching observers.
async fn get_snapshot(State(state): State<Arc<AppState>>) -> Result<Json<Snapshot>, ApiError> {
    let snap = state.store.snapshot().map_err(internal)?;
    Ok(Json(snap))
}

/// Direct selection write — the source's fallback for observers that hydrate
/// from storage rather than the live channel.
async fn put_selection(
    State(state): State<Arc<AppState>>,
    Json(selection): Json<Selection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    state
        .store
        .set_last_selection(&selection)
        .map_err(internal)?;
    Ok(Json(SuccessResponse::ok()))
}

/// Clear one snapshot key. Observers may reset individual fields.
async fn clear_key(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
    if !keys::ALL.contains(&key.as_str()) {
        return Err((StatusCode::NOT_FOUND, format!("Unknown key: {}", key)));
    }
    state.store.clear(&key).map_err(internal)?;
    Ok(Json(SuccessResponse::with_message(format!(
        "Cleared {}",
        key
    ))))
}
