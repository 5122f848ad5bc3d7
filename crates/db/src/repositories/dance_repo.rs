//! Repository for the `dances` table.

use repertoire_core::types::DbId;
use sqlx::PgPool;

use crate::models::dance::{CreateDance, Dance, UpdateDance};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, choreographer, formation, notes, created_at, updated_at";

/// Provides CRUD operations for dances.
pub struct DanceRepo;

impl DanceRepo {
    /// Insert a new dance, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateDance) -> Result<Dance, sqlx::Error> {
        let query = format!(
            "INSERT INTO dances (title, choreographer, formation, notes)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Dance>(&query)
            .bind(&input.title)
            .bind(&input.choreographer)
            .bind(&input.formation)
            .bind(&input.notes)
            .fetch_one(pool)
            .await
    }

    /// Find a dance by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Dance>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM dances WHERE id = $1");
        sqlx::query_as::<_, Dance>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all dances alphabetically by title.
    pub async fn list(pool: &PgPool) -> Result<Vec<Dance>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM dances ORDER BY title, id");
        sqlx::query_as::<_, Dance>(&query).fetch_all(pool).await
    }

    /// Update a dance. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateDance,
    ) -> Result<Option<Dance>, sqlx::Error> {
        let query = format!(
            "UPDATE dances SET
                title = COALESCE($2, title),
                choreographer = COALESCE($3, choreographer),
                formation = COALESCE($4, formation),
                notes = COALESCE($5, notes),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Dance>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.choreographer)
            .bind(&input.formation)
            .bind(&input.notes)
            .fetch_optional(pool)
            .await
    }

    /// Delete a dance by ID. Its program links go with it (`ON DELETE CASCADE`).
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM dances WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
