//! Dance entity model and DTOs.

use repertoire_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A dance row from the `dances` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Dance {
    pub id: DbId,
    pub title: String,
    pub choreographer: Option<String>,
    pub formation: Option<String>,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new dance.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDance {
    pub title: String,
    pub choreographer: Option<String>,
    pub formation: Option<String>,
    pub notes: Option<String>,
}

/// DTO for updating an existing dance. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UpdateDance {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choreographer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}
