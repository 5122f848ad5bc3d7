//! Route definitions for the `/dances` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::dance;
use crate::state::AppState;

/// Routes mounted at `/dances`.
///
/// ```text
/// GET    /                          -> list
/// POST   /                          -> create
/// GET    /{id}                      -> get_by_id
/// PUT    /{id}                      -> update
/// DELETE /{id}                      -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(dance::list).post(dance::create))
        .route(
            "/{id}",
            get(dance::get_by_id)
                .put(dance::update)
                .delete(dance::delete),
        )
}
