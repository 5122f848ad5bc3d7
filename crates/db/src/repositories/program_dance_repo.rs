//! Repository for the `programs_dances` join table.

use repertoire_core::types::DbId;
use sqlx::PgPool;

use crate::models::program_dance::ProgramDance;

const COLUMNS: &str = "id, program_id, dance_id, position, created_at";

/// Provides link/unlink operations between programs and dances.
pub struct ProgramDanceRepo;

impl ProgramDanceRepo {
    /// Link a dance into a program at `position`, returning the created row.
    pub async fn create(
        pool: &PgPool,
        program_id: DbId,
        dance_id: DbId,
        position: i32,
    ) -> Result<ProgramDance, sqlx::Error> {
        let query = format!(
            "INSERT INTO programs_dances (program_id, dance_id, position)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProgramDance>(&query)
            .bind(program_id)
            .bind(dance_id)
            .bind(position)
            .fetch_one(pool)
            .await
    }

    /// All links of a program in running order.
    pub async fn list_by_program(
        pool: &PgPool,
        program_id: DbId,
    ) -> Result<Vec<ProgramDance>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM programs_dances WHERE program_id = $1 ORDER BY position, id"
        );
        sqlx::query_as::<_, ProgramDance>(&query)
            .bind(program_id)
            .fetch_all(pool)
            .await
    }

    /// All links referencing a dance, across programs.
    pub async fn list_by_dance(
        pool: &PgPool,
        dance_id: DbId,
    ) -> Result<Vec<ProgramDance>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM programs_dances WHERE dance_id = $1 ORDER BY id");
        sqlx::query_as::<_, ProgramDance>(&query)
            .bind(dance_id)
            .fetch_all(pool)
            .await
    }

    /// Position one past the last dance of a program.
    pub async fn next_position(pool: &PgPool, program_id: DbId) -> Result<i32, sqlx::Error> {
        let (next,): (i32,) = sqlx::query_as(
            "SELECT COALESCE(MAX(position), 0) + 1 FROM programs_dances WHERE program_id = $1",
        )
        .bind(program_id)
        .fetch_one(pool)
        .await?;
        Ok(next)
    }

    /// Remove a link by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM programs_dances WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
