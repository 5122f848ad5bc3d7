use crate::error::CoreError;
use crate::types::DbId;

use super::op::OpKind;

/// Boxed storage error carried across the undo log.
pub type StoreFailure = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by the undo log to the undo/redo caller.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    /// The recorded action is malformed and was not pushed.
    #[error(transparent)]
    InvalidAction(#[from] CoreError),

    /// A storage call failed in a way that aborts the batch.
    ///
    /// The stacks are left exactly as they were before the attempt.
    #[error("{kind} on {table} id {id} failed: {source}")]
    Storage {
        kind: OpKind,
        table: String,
        id: DbId,
        #[source]
        source: StoreFailure,
    },
}
