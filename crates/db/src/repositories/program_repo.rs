//! Repository for the `programs` table.

use repertoire_core::types::DbId;
use sqlx::PgPool;

use crate::models::program::{CreateProgram, Program, UpdateProgram};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, event_date, venue, notes, created_at, updated_at";

/// Provides CRUD operations for programs.
///
/// The program's dance list lives in `programs_dances`; see
/// [`ProgramDanceRepo`](super::ProgramDanceRepo).
pub struct ProgramRepo;

impl ProgramRepo {
    /// Insert a new program, returning the created row. `dance_ids` is ignored here.
    pub async fn create(pool: &PgPool, input: &CreateProgram) -> Result<Program, sqlx::Error> {
        let query = format!(
            "INSERT INTO programs (title, event_date, venue, notes)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Program>(&query)
            .bind(&input.title)
            .bind(input.event_date)
            .bind(&input.venue)
            .bind(&input.notes)
            .fetch_one(pool)
            .await
    }

    /// Find a program by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Program>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM programs WHERE id = $1");
        sqlx::query_as::<_, Program>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all programs, soonest event first, undated programs last.
    pub async fn list(pool: &PgPool) -> Result<Vec<Program>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM programs ORDER BY event_date NULLS LAST, created_at DESC"
        );
        sqlx::query_as::<_, Program>(&query).fetch_all(pool).await
    }

    /// Update a program. Only non-`None` scalar fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProgram,
    ) -> Result<Option<Program>, sqlx::Error> {
        let query = format!(
            "UPDATE programs SET
                title = COALESCE($2, title),
                event_date = COALESCE($3, event_date),
                venue = COALESCE($4, venue),
                notes = COALESCE($5, notes),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Program>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(input.event_date)
            .bind(&input.venue)
            .bind(&input.notes)
            .fetch_optional(pool)
            .await
    }

    /// Delete a program by ID. Its dance links go with it (`ON DELETE CASCADE`).
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM programs WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
