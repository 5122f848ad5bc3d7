//! Recent-notice feed.
//!
//! [`NoticeFeed`] subscribes to the [`EventBus`](crate::bus::EventBus) and
//! keeps the most recent notices in a bounded ring so clients can poll for
//! anything they have not shown yet. It runs as a long-lived background
//! task and shuts down when the bus sender is dropped.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{broadcast, RwLock};

use crate::bus::BusEvent;
use crate::notice::Notice;

/// Default number of notices retained.
pub const DEFAULT_FEED_CAPACITY: usize = 50;

/// A notice with its position in the feed.
#[derive(Debug, Clone, Serialize)]
pub struct FeedEntry {
    pub seq: u64,
    pub notice: Notice,
    pub timestamp: DateTime<Utc>,
}

struct FeedState {
    entries: VecDeque<FeedEntry>,
    next_seq: u64,
}

/// Bounded in-memory store of recent notices.
pub struct NoticeFeed {
    capacity: usize,
    state: RwLock<FeedState>,
}

impl NoticeFeed {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            state: RwLock::new(FeedState {
                entries: VecDeque::new(),
                next_seq: 1,
            }),
        }
    }

    /// Append a notice, evicting the oldest when full.
    pub async fn push(&self, notice: Notice, timestamp: DateTime<Utc>) {
        let mut state = self.state.write().await;
        let seq = state.next_seq;
        state.next_seq += 1;
        if state.entries.len() == self.capacity {
            state.entries.pop_front();
        }
        state.entries.push_back(FeedEntry {
            seq,
            notice,
            timestamp,
        });
    }

    /// Notices with a sequence number greater than `since`, oldest first.
    pub async fn since(&self, since: u64) -> Vec<FeedEntry> {
        self.state
            .read()
            .await
            .entries
            .iter()
            .filter(|e| e.seq > since)
            .cloned()
            .collect()
    }

    /// Drop every retained notice (used on sign-out).
    pub async fn clear(&self) {
        self.state.write().await.entries.clear();
    }

    /// Run the feed loop until the bus closes.
    pub async fn run(&self, mut receiver: broadcast::Receiver<BusEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Some(notice) = Notice::from_event(&event) {
                        self.push(notice, event.emitted_at).await;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notice feed lagged, some notices were dropped");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notice feed shutting down");
                    break;
                }
            }
        }
    }
}

impl Default for NoticeFeed {
    fn default() -> Self {
        Self::new(DEFAULT_FEED_CAPACITY)
    }
}
