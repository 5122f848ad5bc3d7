//! Handlers for the undo/redo history.
//!
//! Undo and redo answer `204 No Content` when there was nothing to do: an
//! empty stack, an open edit session, or another replay still running.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use repertoire_core::undo::shortcuts::{resolve_shortcut, FocusTarget, KeyChord, ShortcutCommand};
use repertoire_core::undo::{Direction, HistorySnapshot};
use repertoire_events::Notice;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// History controls plus the cache generation clients refetch against.
#[derive(Debug, Serialize)]
pub struct HistoryView {
    #[serde(flatten)]
    pub snapshot: HistorySnapshot,
    pub cache_generation: u64,
}

/// Body of an undo or redo request.
#[derive(Debug, Default, Deserialize)]
pub struct ReplayRequest {
    /// Path the client is showing, used to redirect away from deleted records.
    #[serde(default)]
    pub current_path: Option<String>,
}

/// A key press forwarded by the client.
#[derive(Debug, Deserialize)]
pub struct ShortcutRequest {
    #[serde(flatten)]
    pub chord: KeyChord,
    #[serde(default)]
    pub focus: FocusTarget,
    #[serde(default)]
    pub current_path: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FormActiveRequest {
    pub active: bool,
}

#[derive(Debug, Serialize)]
pub struct EditSessionToken {
    pub token: Uuid,
}

fn view(state: &AppState) -> HistoryView {
    HistoryView {
        snapshot: state.history.snapshot(),
        cache_generation: state.cache.generation(),
    }
}

/// GET /api/v1/history
pub async fn snapshot(State(state): State<AppState>) -> Json<DataResponse<HistoryView>> {
    Json(DataResponse { data: view(&state) })
}

/// POST /api/v1/history/undo
///
/// The body is optional; a bare POST undoes without a redirect check.
pub async fn undo(
    State(state): State<AppState>,
    input: Option<Json<ReplayRequest>>,
) -> AppResult<Response> {
    let input = input.map(|Json(input)| input).unwrap_or_default();
    replay(&state, Direction::Undo, input.current_path.as_deref()).await
}

/// POST /api/v1/history/redo
pub async fn redo(
    State(state): State<AppState>,
    input: Option<Json<ReplayRequest>>,
) -> AppResult<Response> {
    let input = input.map(|Json(input)| input).unwrap_or_default();
    replay(&state, Direction::Redo, input.current_path.as_deref()).await
}

/// POST /api/v1/history/shortcut
///
/// Chords pressed while a text field has focus are left to the field.
pub async fn shortcut(
    State(state): State<AppState>,
    Json(input): Json<ShortcutRequest>,
) -> AppResult<Response> {
    let direction = match resolve_shortcut(&input.chord, input.focus) {
        Some(ShortcutCommand::Undo) => Direction::Undo,
        Some(ShortcutCommand::Redo) => Direction::Redo,
        None => return Ok(StatusCode::NO_CONTENT.into_response()),
    };
    replay(&state, direction, input.current_path.as_deref()).await
}

async fn replay(
    state: &AppState,
    direction: Direction,
    current_path: Option<&str>,
) -> AppResult<Response> {
    let outcome = match direction {
        Direction::Undo => state.history.undo(current_path).await,
        Direction::Redo => state.history.redo(current_path).await,
    };

    match outcome {
        Ok(Some(replay)) => {
            if replay.report.is_partial() {
                state
                    .event_bus
                    .notify(Notice::partial_restore(&replay.label, replay.report.skipped));
            }
            Ok(Json(DataResponse { data: replay }).into_response())
        }
        Ok(None) => Ok(StatusCode::NO_CONTENT.into_response()),
        Err(err) => {
            state
                .event_bus
                .notify(Notice::replay_failed(direction.as_str()));
            Err(AppError::History(err))
        }
    }
}

/// PUT /api/v1/history/form-active
pub async fn set_form_active(
    State(state): State<AppState>,
    Json(input): Json<FormActiveRequest>,
) -> Json<DataResponse<HistoryView>> {
    state.history.set_form_active(input.active);
    Json(DataResponse { data: view(&state) })
}

/// POST /api/v1/history/edit-sessions
pub async fn acquire_edit_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<DataResponse<EditSessionToken>>) {
    let token = state.edit_sessions.acquire(state.history.history());
    (
        StatusCode::CREATED,
        Json(DataResponse {
            data: EditSessionToken { token },
        }),
    )
}

/// DELETE /api/v1/history/edit-sessions/{token}
pub async fn release_edit_session(
    State(state): State<AppState>,
    Path(token): Path<Uuid>,
) -> AppResult<StatusCode> {
    if state.edit_sessions.release(token) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Edit session {token} is not open")))
    }
}
