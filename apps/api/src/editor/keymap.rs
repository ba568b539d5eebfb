//! Keyboard bindings for spacing commands.
//!
//! Keys arrive as DOM `KeyboardEvent.key` strings. Bindings are live only while a
//! block is selected, so typing elsewhere on the page never moves content.

use serde::{Deserialize, Serialize};

use crate::editor::selection::SpacingCommand;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum KeyPress {
    Enter,
    Delete,
    Backspace,
    Other(String),
}

impl From<String> for KeyPress {
    fn from(key: String) -> Self {
        match key.as_str() {
            "Enter" => KeyPress::Enter,
            "Delete" => KeyPress::Delete,
            "Backspace" => KeyPress::Backspace,
            _ => KeyPress::Other(key),
        }
    }
}

impl From<KeyPress> for String {
    fn from(key: KeyPress) -> Self {
        match key {
            KeyPress::Enter => "Enter".to_string(),
            KeyPress::Delete => "Delete".to_string(),
            KeyPress::Backspace => "Backspace".to_string(),
            KeyPress::Other(other) => other,
        }
    }
}

/// Maps a key press to a spacing command.
pub fn command_for_key(key: &KeyPress, selection_active: bool) -> Option<SpacingCommand> {
    if !selection_active {
        return None;
    }
    match key {
        KeyPress::Enter => Some(SpacingCommand::PushDown),
        KeyPress::Delete | KeyPress::Backspace => Some(SpacingCommand::PullUp),
        KeyPress::Other(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bindings_with_selection() {
        assert_eq!(
            command_for_key(&KeyPress::Enter, true),
            Some(SpacingCommand::PushDown)
        );
        assert_eq!(
            command_for_key(&KeyPress::Delete, true),
            Some(SpacingCommand::PullUp)
        );
        assert_eq!(
            command_for_key(&KeyPress::Backspace, true),
            Some(SpacingCommand::PullUp)
        );
        assert_eq!(command_for_key(&KeyPress::from("a".to_string()), true), None);
    }

    #[test]
    fn test_bindings_inactive_without_selection() {
        assert_eq!(command_for_key(&KeyPress::Enter, false), None);
        assert_eq!(command_for_key(&KeyPress::Backspace, false), None);
    }

    #[test]
    fn test_key_press_deserializes_from_dom_key() {
        let key: KeyPress = serde_json::from_str("\"Backspace\"").unwrap();
        assert_eq!(key, KeyPress::Backspace);
        let key: KeyPress = serde_json::from_str("\"ArrowDown\"").unwrap();
        assert_eq!(key, KeyPress::Other("ArrowDown".to_string()));
    }
}
