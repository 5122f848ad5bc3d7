//! Repertoire event bus and user-visible notices.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`BusEvent`]: a topic plus JSON payload, grouped into `notice.*`
//!   and `cache.*` families.
//! - [`Notice`]: transient notifications (the "Undo" toast, partial
//!   restore warnings) carried as `notice.*` events.
//! - [`BusCacheInvalidator`]: the undo log's cache collaborator.
//! - [`NoticeFeed`]: background consumer keeping recent notices for the UI.

pub mod bus;
pub mod cache;
pub mod feed;
pub mod notice;

pub use bus::{BusEvent, EventBus};
pub use cache::BusCacheInvalidator;
pub use feed::{FeedEntry, NoticeFeed};
pub use notice::{Notice, NoticeKind, NoticeLevel};
