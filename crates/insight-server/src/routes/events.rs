//! Ephemeral broadcast surface — SSE for observers without a channel.
//!
//! Fire-and-forget: nobody listening is the normal case, and an observer that
//! lags past the buffer just misses events and re-hydrates from the snapshot.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::get;
use axum::Router;
use futures::{Stream, StreamExt};
use tokio_stream::wrappers::BroadcastStream;

use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/events", get(events))
}

async fn events(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.relay.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|outcome| async move {
        let outcome = outcome.ok()?; // lagged receivers skip ahead
        let json = serde_json::to_string(&outcome).ok()?;
        Some(Ok(Event::default().event(outcome.kind()).data(json)))
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
