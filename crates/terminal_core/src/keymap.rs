//! Keyboard mapping from input-field key events to engine actions.

/// Engine action bound to a key press in the input field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Submit the current input.
    Submit,
    /// Recall the previous history entry.
    HistoryUp,
    /// Recall the next history entry.
    HistoryDown,
    /// Complete the first token.
    Autocomplete,
    /// Clear the output pane.
    ClearScreen,
    /// Cancel the running command.
    CancelCurrent,
}

/// Modifier and selection state accompanying a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyModifiers {
    /// Control key held.
    pub ctrl: bool,
    /// Meta/Command key held.
    pub meta: bool,
    /// The input field has a non-empty text selection.
    pub has_selection: bool,
}

impl KeyAction {
    /// Maps a DOM `KeyboardEvent.key` value to an action.
    ///
    /// Ctrl+C with a text selection is left to the browser so copying still works.
    pub fn from_key(key: &str, modifiers: KeyModifiers) -> Option<Self> {
        match key {
            "Enter" => Some(Self::Submit),
            "ArrowUp" => Some(Self::HistoryUp),
            "ArrowDown" => Some(Self::HistoryDown),
            "Tab" => Some(Self::Autocomplete),
            "l" | "L" if modifiers.ctrl || modifiers.meta => Some(Self::ClearScreen),
            "c" | "C" if modifiers.ctrl && !modifiers.has_selection => Some(Self::CancelCurrent),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_navigation_and_control_keys() {
        let none = KeyModifiers::default();
        let ctrl = KeyModifiers {
            ctrl: true,
            ..KeyModifiers::default()
        };
        let meta = KeyModifiers {
            meta: true,
            ..KeyModifiers::default()
        };

        assert_eq!(KeyAction::from_key("Enter", none), Some(KeyAction::Submit));
        assert_eq!(KeyAction::from_key("Tab", none), Some(KeyAction::Autocomplete));
        assert_eq!(KeyAction::from_key("L", meta), Some(KeyAction::ClearScreen));
        assert_eq!(KeyAction::from_key("c", ctrl), Some(KeyAction::CancelCurrent));
        assert_eq!(KeyAction::from_key("c", meta), None);
        assert_eq!(KeyAction::from_key("l", none), None);
    }

    #[test]
    fn ctrl_c_with_selection_is_left_to_the_browser() {
        let selecting = KeyModifiers {
            ctrl: true,
            has_selection: true,
            ..KeyModifiers::default()
        };
        assert_eq!(KeyAction::from_key("c", selecting), None);
    }
}
