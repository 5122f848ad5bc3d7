//! Program entity model and DTOs.

use chrono::NaiveDate;
use repertoire_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A program row from the `programs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Program {
    pub id: DbId,
    pub title: String,
    pub event_date: Option<NaiveDate>,
    pub venue: Option<String>,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new program.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProgram {
    pub title: String,
    pub event_date: Option<NaiveDate>,
    pub venue: Option<String>,
    pub notes: Option<String>,
    /// Dances to link, in running order.
    #[serde(default)]
    pub dance_ids: Vec<DbId>,
}

/// DTO for updating an existing program. All fields are optional.
///
/// `dance_ids`, when present, replaces the program's dance list.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UpdateProgram {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing)]
    pub dance_ids: Option<Vec<DbId>>,
}
