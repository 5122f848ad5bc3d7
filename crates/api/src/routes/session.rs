use axum::routing::post;
use axum::Router;

use crate::handlers::session;
use crate::state::AppState;

/// Routes mounted at `/session`.
///
/// ```text
/// POST   /sign-out                  -> sign_out
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/sign-out", post(session::sign_out))
}
