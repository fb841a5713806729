//! HTTP-inbound capture — for surfaces that send one-shot captures without
//! holding a channel open.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use insight_protocol::CaptureMessage;

use crate::routes::SuccessResponse;
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/capture", post(capture))
}

async fn capture(
    State(state): State<Arc<AppState>>,
    Json(message): Json<CaptureMessage>,
) -> Json<SuccessResponse> {
    let CaptureMessage::TextSelected(selection) = message;
    state.relay.accept(selection);
    Json(SuccessResponse::ok())
}
