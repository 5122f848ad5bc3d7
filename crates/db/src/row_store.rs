//! Generic single-row writes for the undo log.
//!
//! The undo log replays ops against arbitrary tables using JSON row
//! snapshots. [`PgRowStore`] turns each op into one statement built around
//! `jsonb_populate_record`, which casts every JSON value to its column type.
//! Table and column names are checked against the [`Schema`] and quoted
//! before they reach SQL.

use repertoire_core::schema::{Schema, TableSchema};
use repertoire_core::types::DbId;
use repertoire_core::undo::{Columns, Record, RowStore};
use sqlx::types::Json;

use crate::DbPool;

/// PostgreSQL SQLSTATE for `foreign_key_violation`.
pub const FOREIGN_KEY_VIOLATION: &str = "23503";

#[derive(Debug, thiserror::Error)]
pub enum RowStoreError {
    #[error("Unknown table: {0}")]
    UnknownTable(String),

    #[error("Unknown column {column} on {table}")]
    UnknownColumn { table: String, column: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl RowStoreError {
    /// Whether this is a foreign-key violation reported by PostgreSQL.
    pub fn is_foreign_key_violation(&self) -> bool {
        match self {
            Self::Database(sqlx::Error::Database(db_err)) => {
                db_err.code().as_deref() == Some(FOREIGN_KEY_VIOLATION)
            }
            _ => false,
        }
    }
}

/// [`RowStore`] over a PostgreSQL pool.
#[derive(Clone)]
pub struct PgRowStore {
    pool: DbPool,
    schema: Schema,
}

impl PgRowStore {
    pub fn new(pool: DbPool, schema: Schema) -> Self {
        Self { pool, schema }
    }

    fn table(&self, name: &str) -> Result<&'static TableSchema, RowStoreError> {
        self.schema
            .table(name)
            .ok_or_else(|| RowStoreError::UnknownTable(name.to_string()))
    }
}

/// Quote an SQL identifier.
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Quote every column of `columns`, rejecting any the table does not declare.
fn quoted_columns(table: &TableSchema, columns: &Columns) -> Result<Vec<String>, RowStoreError> {
    columns
        .keys()
        .map(|column| {
            if table.has_column(column) {
                Ok(quote_ident(column))
            } else {
                Err(RowStoreError::UnknownColumn {
                    table: table.name.to_string(),
                    column: column.clone(),
                })
            }
        })
        .collect()
}

/// `INSERT ... SELECT` of the listed columns out of a JSON row.
fn insert_sql(table: &TableSchema, row: &Columns) -> Result<String, RowStoreError> {
    let table_ident = quote_ident(table.name);
    let list = quoted_columns(table, row)?.join(", ");
    Ok(format!(
        "INSERT INTO {table_ident} ({list}) \
         SELECT {list} FROM jsonb_populate_record(NULL::{table_ident}, $1)"
    ))
}

/// `UPDATE ... FROM` assigning the listed columns out of a JSON row.
fn update_sql(table: &TableSchema, columns: &Columns) -> Result<String, RowStoreError> {
    let table_ident = quote_ident(table.name);
    let assignments = quoted_columns(table, columns)?
        .into_iter()
        .map(|column| format!("{column} = source.{column}"))
        .collect::<Vec<_>>()
        .join(", ");
    Ok(format!(
        "UPDATE {table_ident} AS target SET {assignments} \
         FROM jsonb_populate_record(NULL::{table_ident}, $2) AS source \
         WHERE target.id = $1"
    ))
}

fn delete_sql(table: &TableSchema) -> String {
    format!("DELETE FROM {} WHERE id = $1", quote_ident(table.name))
}

impl RowStore for PgRowStore {
    type Error = RowStoreError;

    async fn insert(&self, table: &str, record: &Record) -> Result<(), RowStoreError> {
        let schema = self.table(table)?;
        let row = record.to_row();
        let sql = insert_sql(schema, &row)?;
        sqlx::query(&sql).bind(Json(&row)).execute(&self.pool).await?;
        Ok(())
    }

    async fn update(&self, table: &str, id: DbId, columns: &Columns) -> Result<(), RowStoreError> {
        let schema = self.table(table)?;
        let sql = update_sql(schema, columns)?;
        let result = sqlx::query(&sql)
            .bind(id)
            .bind(Json(columns))
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            tracing::debug!(table, id, "Update matched no row");
        }
        Ok(())
    }

    async fn delete(&self, table: &str, id: DbId) -> Result<(), RowStoreError> {
        let schema = self.table(table)?;
        let result = sqlx::query(&delete_sql(schema))
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            tracing::debug!(table, id, "Delete matched no row");
        }
        Ok(())
    }

    fn is_recoverable(&self, error: &RowStoreError) -> bool {
        error.is_foreign_key_violation()
    }
}
