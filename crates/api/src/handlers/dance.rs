//! Handlers for the `/dances` resource.
//!
//! Every successful write is recorded on the history as one action.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use repertoire_core::error::CoreError;
use repertoire_core::schema::{DANCES, PROGRAMS_DANCES};
use repertoire_core::types::DbId;
use repertoire_core::undo::{Action, Op, Record};
use repertoire_db::models::dance::{CreateDance, Dance, UpdateDance};
use repertoire_db::repositories::{DanceRepo, ProgramDanceRepo};

use super::{changed_columns, record_action};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Dance", id })
}

/// POST /api/v1/dances
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateDance>,
) -> AppResult<(StatusCode, Json<Dance>)> {
    let dance = DanceRepo::create(&state.pool, &input).await?;

    record_action(
        &state,
        Action::new(
            format!("Create Dance: {}", dance.title),
            vec![Op::insert(DANCES.name, Record::from_row(&dance)?)],
        ),
    )?;
    Ok((StatusCode::CREATED, Json(dance)))
}

/// GET /api/v1/dances
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<Dance>>> {
    let dances = DanceRepo::list(&state.pool).await?;
    Ok(Json(dances))
}

/// GET /api/v1/dances/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Dance>> {
    let dance = DanceRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(dance))
}

/// PUT /api/v1/dances/{id}
///
/// Records nothing when no field actually changed.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateDance>,
) -> AppResult<Json<Dance>> {
    let before = DanceRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    let changes = changed_columns(&input)?;

    let dance = DanceRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;

    if let Some(op) = Op::update_from_snapshot(DANCES.name, &Record::from_row(&before)?, &changes)
    {
        record_action(
            &state,
            Action::new(format!("Edit Dance: {}", dance.title), vec![op]),
        )?;
    }
    Ok(Json(dance))
}

/// DELETE /api/v1/dances/{id}
///
/// The dance's program links are deleted with it and restored with it.
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    let dance = DanceRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    let links = ProgramDanceRepo::list_by_dance(&state.pool, id).await?;

    if !DanceRepo::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }

    let mut ops = vec![Op::delete(DANCES.name, Record::from_row(&dance)?)];
    for link in &links {
        ops.push(Op::delete(PROGRAMS_DANCES.name, Record::from_row(link)?));
    }
    record_action(
        &state,
        Action::new(format!("Delete Dance: {}", dance.title), ops),
    )?;
    Ok(StatusCode::NO_CONTENT)
}
