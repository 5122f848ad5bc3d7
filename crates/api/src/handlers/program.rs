//! Handlers for the `/programs` resource.
//!
//! A program's dance list is stored as `programs_dances` rows. Saving a
//! program writes the program row and the link changes, and records them
//! together as one action.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use repertoire_core::error::CoreError;
use repertoire_core::schema::{PROGRAMS, PROGRAMS_DANCES};
use repertoire_core::types::DbId;
use repertoire_core::undo::relations::diff_relations;
use repertoire_core::undo::{Action, Op, Record};
use repertoire_db::models::program::{CreateProgram, Program, UpdateProgram};
use repertoire_db::models::program_dance::ProgramDance;
use repertoire_db::repositories::{DanceRepo, ProgramDanceRepo, ProgramRepo};
use repertoire_db::DbPool;
use serde::Serialize;

use super::{changed_columns, record_action};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// A program with its dances in running order.
#[derive(Debug, Serialize)]
pub struct ProgramDetail {
    #[serde(flatten)]
    pub program: Program,
    pub dance_ids: Vec<DbId>,
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Program",
        id,
    })
}

async fn detail(pool: &DbPool, program: Program) -> AppResult<ProgramDetail> {
    let links = ProgramDanceRepo::list_by_program(pool, program.id).await?;
    Ok(ProgramDetail {
        program,
        dance_ids: links.into_iter().map(|l| l.dance_id).collect(),
    })
}

/// Fail before writing anything if a requested dance does not exist.
async fn ensure_dances_exist(pool: &DbPool, dance_ids: &[DbId]) -> AppResult<()> {
    for &dance_id in dance_ids {
        if DanceRepo::find_by_id(pool, dance_id).await?.is_none() {
            return Err(AppError::Core(CoreError::NotFound {
                entity: "Dance",
                id: dance_id,
            }));
        }
    }
    Ok(())
}

fn link_op(link: &ProgramDance, delete: bool) -> AppResult<Op> {
    let record = Record::from_row(link)?;
    Ok(if delete {
        Op::delete(PROGRAMS_DANCES.name, record)
    } else {
        Op::insert(PROGRAMS_DANCES.name, record)
    })
}

/// POST /api/v1/programs
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateProgram>,
) -> AppResult<(StatusCode, Json<ProgramDetail>)> {
    let dance_ids = diff_relations(&[], &input.dance_ids).added;
    ensure_dances_exist(&state.pool, &dance_ids).await?;

    let program = ProgramRepo::create(&state.pool, &input).await?;
    let mut ops = vec![Op::insert(PROGRAMS.name, Record::from_row(&program)?)];
    for (position, &dance_id) in (1..).zip(&dance_ids) {
        let link = ProgramDanceRepo::create(&state.pool, program.id, dance_id, position).await?;
        ops.push(link_op(&link, false)?);
    }

    record_action(
        &state,
        Action::new(format!("Create Program: {}", program.title), ops),
    )?;
    let detail = detail(&state.pool, program).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

/// GET /api/v1/programs
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<Program>>> {
    let programs = ProgramRepo::list(&state.pool).await?;
    Ok(Json(programs))
}

/// GET /api/v1/programs/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ProgramDetail>> {
    let program = ProgramRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(detail(&state.pool, program).await?))
}

/// PUT /api/v1/programs/{id}
///
/// When `dance_ids` is present, links are added and removed to match it;
/// dances kept on the program keep their position.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProgram>,
) -> AppResult<Json<ProgramDetail>> {
    let before = ProgramRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    if let Some(dance_ids) = &input.dance_ids {
        ensure_dances_exist(&state.pool, dance_ids).await?;
    }
    let changes = changed_columns(&input)?;

    let program = ProgramRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;

    let mut ops = Vec::new();
    if let Some(op) = Op::update_from_snapshot(PROGRAMS.name, &Record::from_row(&before)?, &changes)
    {
        ops.push(op);
    }

    if let Some(desired) = &input.dance_ids {
        let links = ProgramDanceRepo::list_by_program(&state.pool, id).await?;
        let current: Vec<DbId> = links.iter().map(|l| l.dance_id).collect();
        let diff = diff_relations(&current, desired);

        for link in links.iter().filter(|l| diff.removed.contains(&l.dance_id)) {
            ProgramDanceRepo::delete(&state.pool, link.id).await?;
            ops.push(link_op(link, true)?);
        }

        let mut position = ProgramDanceRepo::next_position(&state.pool, id).await?;
        for &dance_id in &diff.added {
            let link = ProgramDanceRepo::create(&state.pool, id, dance_id, position).await?;
            ops.push(link_op(&link, false)?);
            position += 1;
        }
    }

    if !ops.is_empty() {
        record_action(
            &state,
            Action::new(format!("Edit Program: {}", program.title), ops),
        )?;
    }
    Ok(Json(detail(&state.pool, program).await?))
}

/// DELETE /api/v1/programs/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    let program = ProgramRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    let links = ProgramDanceRepo::list_by_program(&state.pool, id).await?;

    if !ProgramRepo::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }

    let mut ops = vec![Op::delete(PROGRAMS.name, Record::from_row(&program)?)];
    for link in &links {
        ops.push(link_op(link, true)?);
    }
    record_action(
        &state,
        Action::new(format!("Delete Program: {}", program.title), ops),
    )?;
    Ok(StatusCode::NO_CONTENT)
}
