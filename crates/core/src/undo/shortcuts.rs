//! Global undo/redo keyboard shortcuts.

use serde::{Deserialize, Serialize};

/// Command a key chord maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShortcutCommand {
    Undo,
    Redo,
}

/// The kind of element holding keyboard focus when the chord was pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusTarget {
    TextInput,
    TextArea,
    ContentEditable,
    #[default]
    Other,
}

impl FocusTarget {
    /// Text-editing elements keep their own native undo.
    pub fn is_editable(&self) -> bool {
        !matches!(self, Self::Other)
    }
}

/// A key press with its modifiers.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct KeyChord {
    pub key: String,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub meta: bool,
    #[serde(default)]
    pub shift: bool,
}

/// Map a chord to a history command.
///
/// `Ctrl/Cmd+Z` undoes, `Ctrl/Cmd+Shift+Z` and `Ctrl+Y` redo. Nothing fires
/// while a text input, textarea or content-editable element has focus.
pub fn resolve_shortcut(chord: &KeyChord, focus: FocusTarget) -> Option<ShortcutCommand> {
    if focus.is_editable() || !(chord.ctrl || chord.meta) {
        return None;
    }
    match chord.key.to_ascii_lowercase().as_str() {
        "z" if chord.shift => Some(ShortcutCommand::Redo),
        "z" => Some(ShortcutCommand::Undo),
        "y" if chord.ctrl && !chord.shift => Some(ShortcutCommand::Redo),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chord(key: &str, ctrl: bool, meta: bool, shift: bool) -> KeyChord {
        KeyChord {
            key: key.to_string(),
            ctrl,
            meta,
            shift,
        }
    }

    #[test]
    fn ctrl_or_cmd_z_undoes() {
        assert_eq!(
            resolve_shortcut(&chord("z", true, false, false), FocusTarget::Other),
            Some(ShortcutCommand::Undo)
        );
        assert_eq!(
            resolve_shortcut(&chord("z", false, true, false), FocusTarget::Other),
            Some(ShortcutCommand::Undo)
        );
    }

    #[test]
    fn shift_z_and_ctrl_y_redo() {
        assert_eq!(
            resolve_shortcut(&chord("Z", true, false, true), FocusTarget::Other),
            Some(ShortcutCommand::Redo)
        );
        assert_eq!(
            resolve_shortcut(&chord("y", true, false, false), FocusTarget::Other),
            Some(ShortcutCommand::Redo)
        );
    }

    #[test]
    fn editable_focus_disables_shortcuts() {
        for focus in [
            FocusTarget::TextInput,
            FocusTarget::TextArea,
            FocusTarget::ContentEditable,
        ] {
            assert_eq!(resolve_shortcut(&chord("z", true, false, false), focus), None);
        }
    }

    #[test]
    fn unmodified_keys_are_ignored() {
        assert_eq!(
            resolve_shortcut(&chord("z", false, false, false), FocusTarget::Other),
            None
        );
        assert_eq!(
            resolve_shortcut(&chord("x", true, false, false), FocusTarget::Other),
            None
        );
    }
}
