//! Key handling and bindings.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::state::SessionState;

/// Result of handling a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// No action, continue.
    None,
    /// Exit the loop.
    Quit,
    /// A view toggle happened: redraw immediately and skip this tick's
    /// sampling so the chart cadence is undisturbed.
    FastSwitch,
}

/// Handles a key event, mutating session state through its transitions.
pub fn handle_key(state: &mut SessionState, key: KeyEvent) -> KeyAction {
    if key.kind == KeyEventKind::Release {
        return KeyAction::None;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') => KeyAction::Quit,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => KeyAction::Quit,
        KeyCode::Char('p') | KeyCode::Char('P') => {
            state.toggle_pause();
            KeyAction::None
        }
        KeyCode::Char('u') | KeyCode::Char('U') => {
            state.toggle_units();
            KeyAction::None
        }
        KeyCode::Char('d') | KeyCode::Char('D') => {
            state.toggle_data();
            KeyAction::FastSwitch
        }
        KeyCode::Char('i') | KeyCode::Char('I') => {
            state.toggle_info();
            KeyAction::FastSwitch
        }
        _ => KeyAction::None,
    }
}
