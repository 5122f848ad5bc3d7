//! `GET /health`: liveness, database reachability and a glance at the undo
//! log. Mounted at the root, outside `/api/v1`.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when the database is unreachable.
    pub status: &'static str,
    pub version: &'static str,
    pub database_reachable: bool,
    pub undo_depth: usize,
    pub redo_depth: usize,
    /// Bumped after every replay; clients compare it to refetch stale queries.
    pub cache_generation: u64,
    /// Subscribers on the event bus (the notice feed counts as one).
    pub bus_listeners: usize,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let database_reachable = match repertoire_db::health_check(&state.pool).await {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(error = %err, "Health check could not reach the database");
            false
        }
    };
    let history = state.history.snapshot();

    Json(HealthResponse {
        status: if database_reachable { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        database_reachable,
        undo_depth: history.undo_depth,
        redo_depth: history.redo_depth,
        cache_generation: state.cache.generation(),
        bus_listeners: state.event_bus.listener_count(),
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
