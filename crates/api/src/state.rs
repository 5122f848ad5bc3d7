use std::sync::Arc;

use repertoire_core::schema::Schema;
use repertoire_core::undo::UndoManager;
use repertoire_db::PgRowStore;
use repertoire_events::{BusCacheInvalidator, EventBus, NoticeFeed};

use crate::config::ServerConfig;
use crate::edit_sessions::EditSessionRegistry;

/// The undo log as wired for this server: PostgreSQL rows, bus-announced
/// cache invalidation.
pub type History = UndoManager<PgRowStore, Arc<BusCacheInvalidator>>;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: repertoire_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Undo/redo history of the signed-in session.
    pub history: Arc<History>,
    /// Client-held edit sessions gating the history.
    pub edit_sessions: Arc<EditSessionRegistry>,
    /// Centralized event bus for notices and cache announcements.
    pub event_bus: Arc<EventBus>,
    /// Cache generation counter bumped after every replay.
    pub cache: Arc<BusCacheInvalidator>,
    /// Recent notices for clients to poll.
    pub notices: Arc<NoticeFeed>,
}

impl AppState {
    /// Wire the history, bus and notice feed around `pool`.
    ///
    /// The feed still has to be started with
    /// [`NoticeFeed::run`](repertoire_events::NoticeFeed::run).
    pub fn new(pool: repertoire_db::DbPool, config: ServerConfig) -> Self {
        let event_bus = Arc::new(EventBus::default());
        let cache = Arc::new(BusCacheInvalidator::new(Arc::clone(&event_bus)));
        let store = PgRowStore::new(pool.clone(), Schema::REPERTOIRE);
        let history = UndoManager::new(
            store,
            Arc::clone(&cache),
            Schema::REPERTOIRE,
            config.undo_max_depth,
        );
        let notices = Arc::new(NoticeFeed::new(config.notice_feed_capacity));

        Self {
            pool,
            config: Arc::new(config),
            history: Arc::new(history),
            edit_sessions: Arc::new(EditSessionRegistry::new()),
            event_bus,
            cache,
            notices,
        }
    }
}
