//! Cache invalidation over the event bus.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use repertoire_core::undo::CacheInvalidator;

use crate::bus::{BusEvent, EventBus};

/// Event type published on every invalidation.
pub const CACHE_INVALIDATED: &str = "cache.invalidated";

/// Invalidates every cached query by bumping a generation counter and
/// announcing it on the bus. Clients refetch whenever the generation they
/// last saw is stale.
pub struct BusCacheInvalidator {
    bus: Arc<EventBus>,
    generation: AtomicU64,
}

impl BusCacheInvalidator {
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self {
            bus,
            generation: AtomicU64::new(0),
        }
    }

    /// Current cache generation.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}

impl CacheInvalidator for BusCacheInvalidator {
    fn invalidate_all(&self) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(generation, "Query cache invalidated");
        self.bus.publish(BusEvent::new(
            CACHE_INVALIDATED,
            serde_json::json!({ "generation": generation }),
        ));
    }
}
