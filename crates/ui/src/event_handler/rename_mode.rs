use super::KeyAction;
use crate::state::{AppState, InputMode};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

pub(super) fn handle_rename_key(event: KeyEvent, state: &mut AppState) -> Option<KeyAction> {
    let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);

    match event.code {
        KeyCode::Char('c') if ctrl => Some(KeyAction::Quit),
        KeyCode::Esc => {
            state.cancel_rename();
            None
        }
        KeyCode::Enter => {
            let name = state.rename.take().trim().to_string();
            state.mode = InputMode::Chat;
            if name.is_empty() { None } else { Some(KeyAction::SubmitRename { name }) }
        }
        KeyCode::Left => {
            state.rename.move_left();
            None
        }
        KeyCode::Right => {
            state.rename.move_right();
            None
        }
        KeyCode::Home => {
            state.rename.move_home();
            None
        }
        KeyCode::End => {
            state.rename.move_end();
            None
        }
        KeyCode::Backspace => {
            state.rename.backspace();
            None
        }
        KeyCode::Delete => {
            state.rename.delete();
            None
        }
        KeyCode::Char(c) if !ctrl => {
            state.rename.insert_char(c);
            None
        }
        _ => None,
    }
}
