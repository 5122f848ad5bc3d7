//! Sequential application of an op batch against storage.

use std::future::Future;
use std::sync::Arc;

use crate::schema::Schema;
use crate::types::DbId;

use super::error::HistoryError;
use super::op::{Columns, Op, Record};

/// Row store addressed by table name and integer primary key.
///
/// Every call is an independent single-row statement; there are no
/// multi-statement transactions.
pub trait RowStore: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Insert a full row, including its explicit primary key.
    fn insert(
        &self,
        table: &str,
        record: &Record,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Write `columns` onto the row with primary key `id`.
    fn update(
        &self,
        table: &str,
        id: DbId,
        columns: &Columns,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Remove the row with primary key `id`.
    fn delete(&self, table: &str, id: DbId) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Whether `error` is a referential-integrity violation, the one failure
    /// the executor recovers from (on dependent inserts only).
    fn is_recoverable(&self, error: &Self::Error) -> bool;
}

/// Read-layer cache that must refetch after storage changes underneath it.
pub trait CacheInvalidator: Send + Sync {
    fn invalidate_all(&self);
}

impl<T: RowStore> RowStore for Arc<T> {
    type Error = T::Error;

    fn insert(
        &self,
        table: &str,
        record: &Record,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send {
        (**self).insert(table, record)
    }

    fn update(
        &self,
        table: &str,
        id: DbId,
        columns: &Columns,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send {
        (**self).update(table, id, columns)
    }

    fn delete(&self, table: &str, id: DbId) -> impl Future<Output = Result<(), Self::Error>> + Send {
        (**self).delete(table, id)
    }

    fn is_recoverable(&self, error: &Self::Error) -> bool {
        (**self).is_recoverable(error)
    }
}

impl<T: CacheInvalidator> CacheInvalidator for Arc<T> {
    fn invalidate_all(&self) {
        (**self).invalidate_all();
    }
}

/// Outcome of a batch that ran to completion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct ExecutionReport {
    /// Ops that reached storage successfully.
    pub applied: usize,
    /// Dependent inserts dropped because their referent no longer exists.
    pub skipped: usize,
}

impl ExecutionReport {
    /// Some relations could not be restored.
    pub fn is_partial(&self) -> bool {
        self.skipped > 0
    }
}

/// Apply `ops` one at a time, in order.
///
/// A recoverable error on an insert of a dependent row skips that row and
/// continues; any other error aborts the remainder of the batch. The cache
/// is invalidated exactly once, whether the batch completes or aborts.
pub async fn execute<S, C>(
    store: &S,
    cache: &C,
    schema: &Schema,
    ops: &[Op],
) -> Result<ExecutionReport, HistoryError>
where
    S: RowStore,
    C: CacheInvalidator,
{
    let outcome = apply_all(store, schema, ops).await;
    cache.invalidate_all();
    outcome
}

async fn apply_all<S: RowStore>(
    store: &S,
    schema: &Schema,
    ops: &[Op],
) -> Result<ExecutionReport, HistoryError> {
    let mut report = ExecutionReport::default();

    for op in ops {
        let result = match op {
            Op::Insert { table, record } => store.insert(table, record).await,
            Op::Update { table, id, after, .. } => store.update(table, *id, after).await,
            Op::Delete { table, id, .. } => store.delete(table, *id).await,
        };

        match result {
            Ok(()) => {
                report.applied += 1;
                tracing::debug!(
                    kind = %op.kind(),
                    table = op.table(),
                    id = op.id(),
                    "Replayed op"
                );
            }
            Err(e)
                if matches!(op, Op::Insert { .. })
                    && store.is_recoverable(&e)
                    && schema.is_dependent(op.table(), op.payload()) =>
            {
                report.skipped += 1;
                tracing::warn!(
                    table = op.table(),
                    id = op.id(),
                    error = %e,
                    "Skipped dependent row whose referent no longer exists"
                );
            }
            Err(e) => {
                tracing::error!(
                    kind = %op.kind(),
                    table = op.table(),
                    id = op.id(),
                    error = %e,
                    "Replay aborted"
                );
                return Err(HistoryError::Storage {
                    kind: op.kind(),
                    table: op.table().to_string(),
                    id: op.id(),
                    source: Box::new(e),
                });
            }
        }
    }

    Ok(report)
}
