use axum::extract::State;
use axum::http::StatusCode;

use crate::state::AppState;

/// POST /api/v1/session/sign-out
///
/// Forgets the history: open edit sessions, both stacks and pending notices.
pub async fn sign_out(State(state): State<AppState>) -> StatusCode {
    let released = state.edit_sessions.release_all();
    state.history.clear_stacks();
    state.notices.clear().await;
    tracing::info!(released_edit_sessions = released, "Signed out");
    StatusCode::NO_CONTENT
}
