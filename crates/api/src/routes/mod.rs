pub mod dance;
pub mod health;
pub mod history;
pub mod notices;
pub mod program;
pub mod session;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /history                                 snapshot (GET)
/// /history/undo                            undo (POST)
/// /history/redo                            redo (POST)
/// /history/shortcut                        key chord -> undo/redo (POST)
/// /history/form-active                     flag-style gating (PUT)
/// /history/edit-sessions                   acquire (POST)
/// /history/edit-sessions/{token}           release (DELETE)
///
/// /session/sign-out                        clear history (POST)
///
/// /notices                                 recent notices (GET)
///
/// /dances                                  list, create
/// /dances/{id}                             get, update, delete
///
/// /programs                                list, create
/// /programs/{id}                           get, update, delete
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/history", history::router())
        .nest("/session", session::router())
        .nest("/notices", notices::router())
        .nest("/dances", dance::router())
        .nest("/programs", program::router())
}
