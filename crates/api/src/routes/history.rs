//! Route definitions for the undo/redo history.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::history;
use crate::state::AppState;

/// Routes mounted at `/history`.
///
/// ```text
/// GET    /                          -> snapshot
/// POST   /undo                      -> undo
/// POST   /redo                      -> redo
/// POST   /shortcut                  -> shortcut
/// PUT    /form-active               -> set_form_active
/// POST   /edit-sessions             -> acquire_edit_session
/// DELETE /edit-sessions/{token}     -> release_edit_session
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(history::snapshot))
        .route("/undo", post(history::undo))
        .route("/redo", post(history::redo))
        .route("/shortcut", post(history::shortcut))
        .route("/form-active", put(history::set_form_active))
        .route("/edit-sessions", post(history::acquire_edit_session))
        .route(
            "/edit-sessions/{token}",
            delete(history::release_edit_session),
        )
}
