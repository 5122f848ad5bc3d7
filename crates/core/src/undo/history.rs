//! Undo and redo stacks, edit-session gating, and the replay orchestration.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;

use crate::schema::Schema;

use super::error::HistoryError;
use super::executor::{execute, CacheInvalidator, ExecutionReport, RowStore};
use super::invert::invert;
use super::navigation::redirect_after;
use super::op::{Action, Op};
use super::sort::sort_dependencies;

/// Which stack a replay pops from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Undo,
    Redo,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Undo => "undo",
            Self::Redo => "redo",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only view of the history for rendering controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistorySnapshot {
    pub can_undo: bool,
    pub can_redo: bool,
    pub undo_label: Option<String>,
    pub redo_label: Option<String>,
    pub undo_depth: usize,
    pub redo_depth: usize,
    pub form_active: bool,
}

/// Result of a successful undo or redo.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Replay {
    pub direction: Direction,
    pub label: String,
    pub report: ExecutionReport,
    /// Where the UI should go if it was showing a record the replay deleted.
    pub redirect: Option<String>,
}

struct Entry {
    seq: u64,
    action: Action,
}

#[derive(Default)]
struct HistoryState {
    undo: Vec<Entry>,
    redo: Vec<Entry>,
    next_seq: u64,
    max_depth: Option<usize>,
    edit_sessions: usize,
    form_flag: bool,
    replay_in_flight: bool,
    /// Bumped by every `clear`; a replay started in an older epoch pushes nothing.
    epoch: u64,
}

impl HistoryState {
    fn form_active(&self) -> bool {
        self.edit_sessions > 0 || self.form_flag
    }

    fn stack(&mut self, direction: Direction) -> &mut Vec<Entry> {
        match direction {
            Direction::Undo => &mut self.undo,
            Direction::Redo => &mut self.redo,
        }
    }

    fn push_undo(&mut self, action: Action) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.undo.push(Entry { seq, action });
        if let Some(max) = self.max_depth {
            let excess = self.undo.len().saturating_sub(max);
            self.undo.drain(..excess);
        }
    }

    fn push_redo(&mut self, action: Action) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.redo.push(Entry { seq, action });
    }
}

/// Process-wide undo/redo history for one signed-in session.
///
/// Cheap to clone; all clones share the same stacks. The stacks themselves
/// are never exposed, only [`HistorySnapshot`]s.
#[derive(Clone, Default)]
pub struct UndoHistory {
    state: Arc<Mutex<HistoryState>>,
}

impl UndoHistory {
    /// Empty history. `max_depth` bounds the undo stack; `None` and
    /// `Some(0)` are both unbounded.
    pub fn new(max_depth: Option<usize>) -> Self {
        Self {
            state: Arc::new(Mutex::new(HistoryState {
                max_depth: max_depth.filter(|&depth| depth > 0),
                ..HistoryState::default()
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HistoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record a completed forward action. Always clears the redo stack.
    pub fn push(&self, action: Action) -> Result<(), HistoryError> {
        action.validate()?;
        let mut state = self.lock();
        tracing::debug!(label = %action.label, ops = action.ops.len(), "Recorded action");
        state.push_undo(action);
        state.redo.clear();
        Ok(())
    }

    pub fn snapshot(&self) -> HistorySnapshot {
        let state = self.lock();
        let form_active = state.form_active();
        HistorySnapshot {
            can_undo: !form_active && !state.undo.is_empty(),
            can_redo: !form_active && !state.redo.is_empty(),
            undo_label: state.undo.last().map(|e| e.action.label.clone()),
            redo_label: state.redo.last().map(|e| e.action.label.clone()),
            undo_depth: state.undo.len(),
            redo_depth: state.redo.len(),
            form_active,
        }
    }

    /// Open an edit session. Undo and redo are disabled until every open
    /// session has been dropped.
    pub fn begin_edit(&self) -> EditSession {
        self.lock().edit_sessions += 1;
        EditSession {
            state: Arc::clone(&self.state),
        }
    }

    /// Flag-style gating for callers that cannot hold an [`EditSession`].
    pub fn set_form_active(&self, active: bool) {
        self.lock().form_flag = active;
    }

    /// Empty both stacks. Open edit sessions are left alone.
    pub fn clear(&self) {
        let mut state = self.lock();
        state.undo.clear();
        state.redo.clear();
        state.form_flag = false;
        state.epoch += 1;
    }

    /// Claim the top entry of `direction`'s stack for replay.
    ///
    /// Returns `None` when the stack is empty, a form is open, or another
    /// replay is still running.
    fn begin_replay(&self, direction: Direction) -> Option<ReplayTicket> {
        let mut state = self.lock();
        if state.form_active() || state.replay_in_flight {
            return None;
        }
        let entry = state.stack(direction).last()?;
        let (seq, action) = (entry.seq, entry.action.clone());
        state.replay_in_flight = true;
        Some(ReplayTicket {
            direction,
            seq,
            epoch: state.epoch,
            action,
            _in_flight: InFlight {
                state: Arc::clone(&self.state),
            },
        })
    }

    /// Move a replayed entry to the opposite stack, stored as its inverse.
    ///
    /// The storage writes already happened, so the inverse is pushed even if
    /// the entry left its stack meanwhile (a forward push empties the redo
    /// stack, a depth bound evicts old undo entries). Only a `clear` since
    /// the replay began drops it.
    fn complete_replay(&self, ticket: &ReplayTicket, inverse: Action) {
        let direction = ticket.direction;
        let mut state = self.lock();
        if state.epoch != ticket.epoch {
            tracing::debug!(%direction, "History cleared during replay");
            return;
        }
        let source = state.stack(direction);
        match source.iter().rposition(|e| e.seq == ticket.seq) {
            Some(pos) => {
                source.remove(pos);
            }
            None => tracing::debug!(%direction, "Replayed entry no longer on its stack"),
        }
        match direction {
            Direction::Undo => state.push_redo(inverse),
            Direction::Redo => state.push_undo(inverse),
        }
    }
}

/// Scoped edit session; undo/redo stay disabled while it is alive.
#[must_use = "undo is re-enabled as soon as the session is dropped"]
pub struct EditSession {
    state: Arc<Mutex<HistoryState>>,
}

impl Drop for EditSession {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.edit_sessions = state.edit_sessions.saturating_sub(1);
    }
}

struct InFlight {
    state: Arc<Mutex<HistoryState>>,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replay_in_flight = false;
    }
}

struct ReplayTicket {
    direction: Direction,
    seq: u64,
    epoch: u64,
    action: Action,
    _in_flight: InFlight,
}

/// The undo log wired to its collaborators.
pub struct UndoManager<S, C> {
    history: UndoHistory,
    store: S,
    cache: C,
    schema: Schema,
}

impl<S, C> UndoManager<S, C>
where
    S: RowStore,
    C: CacheInvalidator,
{
    pub fn new(store: S, cache: C, schema: Schema, max_depth: Option<usize>) -> Self {
        Self {
            history: UndoHistory::new(max_depth),
            store,
            cache,
            schema,
        }
    }

    pub fn history(&self) -> &UndoHistory {
        &self.history
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Record an action whose storage writes have already completed.
    pub fn push_action(&self, action: Action) -> Result<(), HistoryError> {
        self.history.push(action)
    }

    pub fn snapshot(&self) -> HistorySnapshot {
        self.history.snapshot()
    }

    pub fn begin_edit(&self) -> EditSession {
        self.history.begin_edit()
    }

    pub fn set_form_active(&self, active: bool) {
        self.history.set_form_active(active);
    }

    pub fn clear_stacks(&self) {
        self.history.clear();
        tracing::info!("Undo history cleared");
    }

    /// Undo the most recent action. `Ok(None)` means there was nothing to do.
    pub async fn undo(&self, current_path: Option<&str>) -> Result<Option<Replay>, HistoryError> {
        self.replay(Direction::Undo, current_path).await
    }

    /// Redo the most recently undone action. `Ok(None)` means there was nothing to do.
    pub async fn redo(&self, current_path: Option<&str>) -> Result<Option<Replay>, HistoryError> {
        self.replay(Direction::Redo, current_path).await
    }

    async fn replay(
        &self,
        direction: Direction,
        current_path: Option<&str>,
    ) -> Result<Option<Replay>, HistoryError> {
        let Some(ticket) = self.history.begin_replay(direction) else {
            tracing::debug!(%direction, "Nothing to replay");
            return Ok(None);
        };

        let inverse: Vec<Op> = sort_dependencies(invert(&ticket.action.ops), &self.schema);
        let report = execute(&self.store, &self.cache, &self.schema, &inverse).await?;

        let redirect =
            current_path.and_then(|path| redirect_after(&inverse, path, &self.schema));
        let label = ticket.action.label.clone();
        self.history
            .complete_replay(&ticket, Action::new(label.clone(), inverse));

        tracing::info!(
            %direction,
            label = %label,
            applied = report.applied,
            skipped = report.skipped,
            "Replay complete"
        );

        Ok(Some(Replay {
            direction,
            label,
            report,
            redirect,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::undo::op::Record;
    use serde_json::json;

    fn create_dance(id: i64, title: &str) -> Action {
        let record = Record::from_value(json!({"id": id, "title": title})).unwrap();
        Action::new(
            format!("Create Dance: {title}"),
            vec![Op::insert("dances", record)],
        )
    }

    #[test]
    fn new_history_is_empty() {
        let snapshot = UndoHistory::default().snapshot();
        assert!(!snapshot.can_undo);
        assert!(!snapshot.can_redo);
        assert_eq!(snapshot.undo_label, None);
        assert_eq!(snapshot.redo_label, None);
    }

    #[test]
    fn push_exposes_top_label() {
        let history = UndoHistory::default();
        history.push(create_dance(1, "Waltz")).unwrap();
        history.push(create_dance(2, "Tango")).unwrap();

        let snapshot = history.snapshot();
        assert!(snapshot.can_undo);
        assert_eq!(snapshot.undo_label.as_deref(), Some("Create Dance: Tango"));
        assert_eq!(snapshot.undo_depth, 2);
    }

    #[test]
    fn push_rejects_invalid_action() {
        let history = UndoHistory::default();
        assert!(history.push(Action::new("Empty", vec![])).is_err());
        assert_eq!(history.snapshot().undo_depth, 0);
    }

    #[test]
    fn push_clears_redo_stack() {
        let history = UndoHistory::default();
        history.push(create_dance(1, "Waltz")).unwrap();
        let ticket = history.begin_replay(Direction::Undo).unwrap();
        history.complete_replay(&ticket, create_dance(1, "Waltz"));
        drop(ticket);
        assert_eq!(history.snapshot().redo_depth, 1);

        history.push(create_dance(2, "Tango")).unwrap();
        let snapshot = history.snapshot();
        assert_eq!(snapshot.redo_depth, 0);
        assert!(!snapshot.can_redo);
    }

    #[test]
    fn max_depth_discards_oldest_entries() {
        let history = UndoHistory::new(Some(2));
        history.push(create_dance(1, "Waltz")).unwrap();
        history.push(create_dance(2, "Tango")).unwrap();
        history.push(create_dance(3, "Foxtrot")).unwrap();

        let snapshot = history.snapshot();
        assert_eq!(snapshot.undo_depth, 2);
        assert_eq!(snapshot.undo_label.as_deref(), Some("Create Dance: Foxtrot"));
    }

    #[test]
    fn zero_max_depth_keeps_every_entry() {
        let history = UndoHistory::new(Some(0));
        history.push(create_dance(1, "Waltz")).unwrap();
        history.push(create_dance(2, "Tango")).unwrap();

        let snapshot = history.snapshot();
        assert!(snapshot.can_undo);
        assert_eq!(snapshot.undo_depth, 2);
    }

    #[test]
    fn edit_session_gates_capabilities() {
        let history = UndoHistory::default();
        history.push(create_dance(1, "Waltz")).unwrap();

        let session = history.begin_edit();
        let gated = history.snapshot();
        assert!(!gated.can_undo);
        assert!(gated.form_active);
        assert_eq!(gated.undo_depth, 1);
        assert!(history.begin_replay(Direction::Undo).is_none());

        drop(session);
        assert!(history.snapshot().can_undo);
    }

    #[test]
    fn nested_edit_sessions_release_independently() {
        let history = UndoHistory::default();
        history.push(create_dance(1, "Waltz")).unwrap();

        let outer = history.begin_edit();
        let inner = history.begin_edit();
        drop(inner);
        assert!(!history.snapshot().can_undo);
        drop(outer);
        assert!(history.snapshot().can_undo);
    }

    #[test]
    fn edit_session_released_on_panic() {
        let history = UndoHistory::default();
        history.push(create_dance(1, "Waltz")).unwrap();

        let cloned = history.clone();
        let result = std::panic::catch_unwind(move || {
            let _session = cloned.begin_edit();
            panic!("form crashed");
        });
        assert!(result.is_err());
        assert!(history.snapshot().can_undo);
    }

    #[test]
    fn form_flag_gates_until_cleared() {
        let history = UndoHistory::default();
        history.push(create_dance(1, "Waltz")).unwrap();

        history.set_form_active(true);
        assert!(!history.snapshot().can_undo);
        history.set_form_active(false);
        assert!(history.snapshot().can_undo);
    }

    #[test]
    fn only_one_replay_at_a_time() {
        let history = UndoHistory::default();
        history.push(create_dance(1, "Waltz")).unwrap();
        history.push(create_dance(2, "Tango")).unwrap();

        let ticket = history.begin_replay(Direction::Undo).unwrap();
        assert!(history.begin_replay(Direction::Undo).is_none());
        drop(ticket);
        assert!(history.begin_replay(Direction::Undo).is_some());
    }

    #[test]
    fn completion_removes_the_replayed_entry_not_the_top() {
        let history = UndoHistory::default();
        history.push(create_dance(1, "Waltz")).unwrap();
        let ticket = history.begin_replay(Direction::Undo).unwrap();

        // A new forward action lands while the replay is in flight.
        history.push(create_dance(2, "Tango")).unwrap();
        history.complete_replay(&ticket, create_dance(1, "Waltz"));

        let snapshot = history.snapshot();
        assert_eq!(snapshot.undo_depth, 1);
        assert_eq!(snapshot.undo_label.as_deref(), Some("Create Dance: Tango"));
        assert_eq!(snapshot.redo_label.as_deref(), Some("Create Dance: Waltz"));
    }

    #[test]
    fn completion_after_clear_pushes_nothing() {
        let history = UndoHistory::default();
        history.push(create_dance(1, "Waltz")).unwrap();
        let ticket = history.begin_replay(Direction::Undo).unwrap();

        history.clear();
        history.complete_replay(&ticket, create_dance(1, "Waltz"));

        let snapshot = history.snapshot();
        assert_eq!(snapshot.undo_depth, 0);
        assert_eq!(snapshot.redo_depth, 0);
    }

    #[test]
    fn redo_completion_survives_a_forward_push() {
        let history = UndoHistory::default();
        history.push(create_dance(1, "Waltz")).unwrap();
        let undo = history.begin_replay(Direction::Undo).unwrap();
        history.complete_replay(&undo, create_dance(1, "Waltz"));
        drop(undo);

        let redo = history.begin_replay(Direction::Redo).unwrap();
        // The forward push empties the redo stack under the running redo.
        history.push(create_dance(2, "Tango")).unwrap();
        history.complete_replay(&redo, create_dance(1, "Waltz"));

        let snapshot = history.snapshot();
        assert_eq!(snapshot.undo_depth, 2);
        assert_eq!(snapshot.undo_label.as_deref(), Some("Create Dance: Waltz"));
        assert_eq!(snapshot.redo_depth, 0);
    }

    #[test]
    fn clear_empties_both_stacks() {
        let history = UndoHistory::default();
        history.push(create_dance(1, "Waltz")).unwrap();
        history.set_form_active(true);
        history.clear();

        let snapshot = history.snapshot();
        assert_eq!(snapshot.undo_depth, 0);
        assert!(!snapshot.form_active);
    }
}
