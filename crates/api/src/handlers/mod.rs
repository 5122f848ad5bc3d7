pub mod dance;
pub mod history;
pub mod notices;
pub mod program;
pub mod session;

use repertoire_core::undo::{Action, Columns};
use repertoire_events::Notice;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Push a completed forward edit onto the history and offer its Undo.
pub(crate) fn record_action(state: &AppState, action: Action) -> AppResult<()> {
    let notice = Notice::action_recorded(&action.label);
    state.history.push_action(action)?;
    state.event_bus.notify(notice);
    Ok(())
}

/// The fields an update DTO actually sets, as a column map.
pub(crate) fn changed_columns<T: Serialize>(input: &T) -> AppResult<Columns> {
    match serde_json::to_value(input) {
        Ok(serde_json::Value::Object(columns)) => Ok(columns),
        Ok(other) => Err(AppError::InternalError(format!(
            "update payload serialized to {other}, expected an object"
        ))),
        Err(e) => Err(AppError::InternalError(e.to_string())),
    }
}
