//! Repertoire domain core.
//!
//! Holds the shared domain types, the table schema the undo log reasons
//! about, and the undo/redo transaction log itself. Nothing in this crate
//! talks to a database directly; storage is reached through
//! [`undo::executor::RowStore`].

pub mod error;
pub mod schema;
pub mod types;
pub mod undo;
