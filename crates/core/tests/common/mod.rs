//! In-memory row store and cache used by the undo log integration tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use repertoire_core::schema::Schema;
use repertoire_core::types::DbId;
use repertoire_core::undo::{CacheInvalidator, Columns, Record, RowStore};
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    #[error("insert on {table} violates a foreign key")]
    ForeignKey { table: String },
    #[error("duplicate key {id} in {table}")]
    Duplicate { table: String, id: DbId },
    #[error("store offline")]
    Offline,
}

/// Row store enforcing the schema's foreign keys (restrict on delete).
pub struct MemoryStore {
    schema: Schema,
    tables: Mutex<HashMap<String, BTreeMap<DbId, Columns>>>,
    offline: AtomicBool,
}

impl MemoryStore {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            tables: Mutex::new(HashMap::new()),
            offline: AtomicBool::new(false),
        }
    }

    /// Write a row directly, bypassing the undo log.
    pub fn seed(&self, table: &str, record: &Record) {
        self.tables
            .lock()
            .unwrap()
            .entry(table.to_string())
            .or_default()
            .insert(record.id, record.columns.clone());
    }

    /// Remove a row directly, as another session would.
    pub fn remove_out_of_band(&self, table: &str, id: DbId) {
        if let Some(rows) = self.tables.lock().unwrap().get_mut(table) {
            rows.remove(&id);
        }
    }

    pub fn row(&self, table: &str, id: DbId) -> Option<Columns> {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .and_then(|rows| rows.get(&id).cloned())
    }

    pub fn count(&self, table: &str) -> usize {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .map_or(0, BTreeMap::len)
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> Result<(), MemoryError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(MemoryError::Offline)
        } else {
            Ok(())
        }
    }
}

impl RowStore for MemoryStore {
    type Error = MemoryError;

    async fn insert(&self, table: &str, record: &Record) -> Result<(), MemoryError> {
        self.check_online()?;
        let mut tables = self.tables.lock().unwrap();
        if let Some(schema) = self.schema.table(table) {
            for fk in schema.foreign_keys {
                let Some(target) = record.get(fk.column).and_then(Value::as_i64) else {
                    continue;
                };
                let exists = tables
                    .get(fk.references)
                    .is_some_and(|rows| rows.contains_key(&target));
                if !exists {
                    return Err(MemoryError::ForeignKey {
                        table: table.to_string(),
                    });
                }
            }
        }
        let rows = tables.entry(table.to_string()).or_default();
        if rows.contains_key(&record.id) {
            return Err(MemoryError::Duplicate {
                table: table.to_string(),
                id: record.id,
            });
        }
        rows.insert(record.id, record.columns.clone());
        Ok(())
    }

    async fn update(&self, table: &str, id: DbId, columns: &Columns) -> Result<(), MemoryError> {
        self.check_online()?;
        let mut tables = self.tables.lock().unwrap();
        if let Some(row) = tables.get_mut(table).and_then(|rows| rows.get_mut(&id)) {
            for (column, value) in columns {
                row.insert(column.clone(), value.clone());
            }
        }
        Ok(())
    }

    async fn delete(&self, table: &str, id: DbId) -> Result<(), MemoryError> {
        self.check_online()?;
        let mut tables = self.tables.lock().unwrap();
        for referencing in self.schema.tables {
            for fk in referencing.foreign_keys.iter().filter(|fk| fk.references == table) {
                let referenced = tables.get(referencing.name).is_some_and(|rows| {
                    rows.values()
                        .any(|row| row.get(fk.column).and_then(Value::as_i64) == Some(id))
                });
                if referenced {
                    return Err(MemoryError::ForeignKey {
                        table: referencing.name.to_string(),
                    });
                }
            }
        }
        if let Some(rows) = tables.get_mut(table) {
            rows.remove(&id);
        }
        Ok(())
    }

    fn is_recoverable(&self, error: &MemoryError) -> bool {
        matches!(error, MemoryError::ForeignKey { .. })
    }
}

#[derive(Default)]
pub struct CountingCache {
    invalidations: AtomicUsize,
}

impl CountingCache {
    pub fn invalidations(&self) -> usize {
        self.invalidations.load(Ordering::SeqCst)
    }
}

impl CacheInvalidator for CountingCache {
    fn invalidate_all(&self) {
        self.invalidations.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn record(value: Value) -> Record {
    Record::from_value(value).expect("test record must carry an id")
}
