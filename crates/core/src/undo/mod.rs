//! Client-side undo/redo transaction log.
//!
//! A forward edit is recorded as an [`Action`]: a labelled batch of
//! reversible [`Op`]s. Undo inverts the batch ([`invert`]), orders it
//! around referential integrity ([`sort`]), applies it to storage
//! ([`executor`]) and moves the inverse onto the opposite stack
//! ([`history`]). After a replay, [`navigation`] tells the UI whether it is
//! now looking at a record that no longer exists.

pub mod error;
pub mod executor;
pub mod history;
pub mod invert;
pub mod navigation;
pub mod op;
pub mod relations;
pub mod shortcuts;
pub mod sort;

pub use error::HistoryError;
pub use executor::{execute, CacheInvalidator, ExecutionReport, RowStore};
pub use history::{
    Direction, EditSession, HistorySnapshot, Replay, UndoHistory, UndoManager,
};
pub use invert::invert;
pub use navigation::redirect_after;
pub use op::{Action, Columns, Op, OpKind, Record};
pub use sort::sort_dependencies;
