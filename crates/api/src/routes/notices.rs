use axum::routing::get;
use axum::Router;

use crate::handlers::notices;
use crate::state::AppState;

/// Routes mounted at `/notices`.
///
/// ```text
/// GET    /?since={seq}              -> list
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(notices::list))
}
