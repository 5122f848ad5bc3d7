//! Reversible storage mutations and the actions that group them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;
use crate::types::DbId;

/// Column name to JSON value, in column order.
pub type Columns = serde_json::Map<String, Value>;

/// A full row snapshot, sufficient to reconstruct the row.
///
/// Serializes flat: `{"id": 9, "title": "Waltz", ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: DbId,
    #[serde(flatten)]
    pub columns: Columns,
}

impl Record {
    pub fn new(id: DbId, columns: Columns) -> Self {
        Self { id, columns }
    }

    /// Build a record from a serialized row.
    ///
    /// The value must be a JSON object with an integer `id`.
    pub fn from_value(value: Value) -> Result<Self, CoreError> {
        let Value::Object(mut columns) = value else {
            return Err(CoreError::Validation(
                "row snapshot must be a JSON object".to_string(),
            ));
        };
        let id = columns
            .remove("id")
            .and_then(|v| v.as_i64())
            .ok_or_else(|| {
                CoreError::Validation("row snapshot must carry an integer id".to_string())
            })?;
        Ok(Self { id, columns })
    }

    /// Serialize a model row (anything with an `id` field) into a record.
    pub fn from_row<T: Serialize>(row: &T) -> Result<Self, CoreError> {
        let value = serde_json::to_value(row)
            .map_err(|e| CoreError::Internal(format!("row snapshot failed: {e}")))?;
        Self::from_value(value)
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns.get(column)
    }

    /// The full row as a single column map, `id` first.
    pub fn to_row(&self) -> Columns {
        let mut row = Columns::new();
        row.insert("id".to_string(), Value::from(self.id));
        for (column, value) in &self.columns {
            row.insert(column.clone(), value.clone());
        }
        row
    }
}

/// Discriminant of an [`Op`], used for logging and error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpKind {
    Insert,
    Update,
    Delete,
}

impl OpKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl std::fmt::Display for OpKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single reversible mutation of one row in one table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Op {
    /// The record already carries its storage-assigned primary key.
    Insert { table: String, record: Record },
    /// `before` holds the pre-edit values of exactly the columns in `after`.
    Update {
        table: String,
        id: DbId,
        before: Columns,
        after: Columns,
    },
    /// `record` is the full pre-delete snapshot.
    Delete {
        table: String,
        id: DbId,
        record: Record,
    },
}

impl Op {
    pub fn insert(table: impl Into<String>, record: Record) -> Self {
        Self::Insert {
            table: table.into(),
            record,
        }
    }

    pub fn delete(table: impl Into<String>, record: Record) -> Self {
        Self::Delete {
            table: table.into(),
            id: record.id,
            record,
        }
    }

    /// Build an update from the row as it was and the columns sent to storage.
    ///
    /// Columns whose value did not change are left out of both sides.
    /// Returns `None` when nothing changed.
    pub fn update_from_snapshot(
        table: impl Into<String>,
        snapshot: &Record,
        changes: &Columns,
    ) -> Option<Self> {
        let mut before = Columns::new();
        let mut after = Columns::new();
        for (column, new_value) in changes {
            let old_value = snapshot.get(column).cloned().unwrap_or(Value::Null);
            if &old_value == new_value {
                continue;
            }
            before.insert(column.clone(), old_value);
            after.insert(column.clone(), new_value.clone());
        }
        if after.is_empty() {
            return None;
        }
        Some(Self::Update {
            table: table.into(),
            id: snapshot.id,
            before,
            after,
        })
    }

    pub fn kind(&self) -> OpKind {
        match self {
            Self::Insert { .. } => OpKind::Insert,
            Self::Update { .. } => OpKind::Update,
            Self::Delete { .. } => OpKind::Delete,
        }
    }

    pub fn table(&self) -> &str {
        match self {
            Self::Insert { table, .. } | Self::Update { table, .. } | Self::Delete { table, .. } => {
                table
            }
        }
    }

    /// Primary key of the row this op touches.
    pub fn id(&self) -> DbId {
        match self {
            Self::Insert { record, .. } => record.id,
            Self::Update { id, .. } | Self::Delete { id, .. } => *id,
        }
    }

    /// The columns that describe the row's references: `after` for updates,
    /// the record for inserts and deletes.
    pub fn payload(&self) -> &Columns {
        match self {
            Self::Insert { record, .. } | Self::Delete { record, .. } => &record.columns,
            Self::Update { after, .. } => after,
        }
    }

    fn validate(&self) -> Result<(), CoreError> {
        match self {
            Self::Insert { .. } => Ok(()),
            Self::Delete { table, id, record } => {
                if *id != record.id {
                    return Err(CoreError::Validation(format!(
                        "delete on {table} targets id {id} but carries a snapshot of id {}",
                        record.id
                    )));
                }
                Ok(())
            }
            Self::Update {
                table,
                id,
                before,
                after,
            } => {
                if after.is_empty() {
                    return Err(CoreError::Validation(format!(
                        "update on {table} id {id} changes no columns"
                    )));
                }
                let same_keys =
                    before.len() == after.len() && after.keys().all(|k| before.contains_key(k));
                if !same_keys {
                    return Err(CoreError::Validation(format!(
                        "update on {table} id {id} has mismatched before/after columns"
                    )));
                }
                Ok(())
            }
        }
    }
}

/// One user-visible edit: a labelled batch of ops replayed together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub label: String,
    pub ops: Vec<Op>,
}

impl Action {
    pub fn new(label: impl Into<String>, ops: Vec<Op>) -> Self {
        Self {
            label: label.into(),
            ops,
        }
    }

    /// Check the structural invariants of every op in the batch.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.ops.is_empty() {
            return Err(CoreError::Validation(format!(
                "action '{}' records no operations",
                self.label
            )));
        }
        self.ops.iter().try_for_each(Op::validate)
    }
}
