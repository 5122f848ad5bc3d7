//! Join rows linking dances into a program's running order.

use repertoire_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `programs_dances` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProgramDance {
    pub id: DbId,
    pub program_id: DbId,
    pub dance_id: DbId,
    pub position: i32,
    pub created_at: Timestamp,
}
