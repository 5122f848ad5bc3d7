//! Transient user-visible notifications.
//!
//! Notices travel over the [`EventBus`] as `notice.*` events so any
//! subscriber (the feed, a WebSocket relay) can surface them.

use serde::{Deserialize, Serialize};

use crate::bus::{BusEvent, EventBus};

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// What a notice reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    /// A forward edit was recorded; offers an inline Undo.
    ActionRecorded,
    /// An undo/redo completed but dropped dependent rows.
    PartialRestore,
    /// An undo/redo aborted; the history is unchanged.
    ReplayFailed,
}

impl NoticeKind {
    pub fn topic(&self) -> &'static str {
        match self {
            Self::ActionRecorded => "notice.action_recorded",
            Self::PartialRestore => "notice.partial_restore",
            Self::ReplayFailed => "notice.replay_failed",
        }
    }
}

/// A transient notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub level: NoticeLevel,
    pub message: String,
    /// Label of the action an inline "Undo" button would revert.
    pub undo_label: Option<String>,
}

impl Notice {
    pub fn action_recorded(label: &str) -> Self {
        Self {
            kind: NoticeKind::ActionRecorded,
            level: NoticeLevel::Info,
            message: label.to_string(),
            undo_label: Some(label.to_string()),
        }
    }

    pub fn partial_restore(label: &str, skipped: usize) -> Self {
        let rows = if skipped == 1 { "relation" } else { "relations" };
        Self {
            kind: NoticeKind::PartialRestore,
            level: NoticeLevel::Warning,
            message: format!(
                "{label}: {skipped} {rows} could not be restored because the linked record no longer exists"
            ),
            undo_label: None,
        }
    }

    /// The cause is logged server-side; the notice only says what failed.
    pub fn replay_failed(command: &str) -> Self {
        Self {
            kind: NoticeKind::ReplayFailed,
            level: NoticeLevel::Error,
            message: format!("Could not {command}; the history is unchanged"),
            undo_label: None,
        }
    }

    /// Recover a notice from a bus event, if it is one.
    pub fn from_event(event: &BusEvent) -> Option<Self> {
        if event.family() != "notice" {
            return None;
        }
        serde_json::from_value(event.payload.clone()).ok()
    }
}

impl From<Notice> for BusEvent {
    fn from(notice: Notice) -> Self {
        let payload = serde_json::to_value(&notice).unwrap_or_default();
        BusEvent::new(notice.kind.topic(), payload)
    }
}

impl EventBus {
    /// Publish a notice as a `notice.*` event.
    pub fn notify(&self, notice: Notice) {
        self.publish(notice.into());
    }
}
