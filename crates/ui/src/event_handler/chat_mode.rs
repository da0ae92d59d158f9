use super::KeyAction;
use crate::state::AppState;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

pub(super) fn handle_chat_key(event: KeyEvent, state: &mut AppState) -> Option<KeyAction> {
    let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);
    let alt = event.modifiers.contains(KeyModifiers::ALT);

    match event.code {
        KeyCode::Char('c') if ctrl => Some(KeyAction::Quit),
        KeyCode::Char('e') if ctrl => Some(KeyAction::ToggleSources),
        KeyCode::Char('o') if ctrl => Some(KeyAction::OpenCitation),
        KeyCode::Char('n') if ctrl => Some(KeyAction::NextProject),
        KeyCode::Char('b') if ctrl => Some(KeyAction::ToggleSidebar),
        KeyCode::Home if ctrl => Some(KeyAction::ScrollTop),
        KeyCode::End if ctrl => Some(KeyAction::JumpToBottom),
        KeyCode::Right if ctrl || alt => Some(KeyAction::NextCitation),
        KeyCode::Left if ctrl || alt => Some(KeyAction::PrevCitation),
        KeyCode::F(2) => {
            state.start_rename();
            None
        }
        KeyCode::Enter => {
            let message = state.input.buffer.trim().to_string();
            if message.is_empty() {
                return None;
            }
            state.input.clear();
            Some(KeyAction::SendMessage { message })
        }
        KeyCode::Up => Some(KeyAction::ScrollUp),
        KeyCode::Down => Some(KeyAction::ScrollDown),
        KeyCode::PageUp => Some(KeyAction::PageUp),
        KeyCode::PageDown => Some(KeyAction::PageDown),
        KeyCode::Tab => Some(KeyAction::FocusNextCited),
        KeyCode::BackTab => Some(KeyAction::FocusPrevCited),
        KeyCode::Esc => {
            state.clear_focus();
            None
        }
        KeyCode::End if state.input.is_empty() => Some(KeyAction::JumpToBottom),
        KeyCode::End => {
            state.input.move_end();
            None
        }
        KeyCode::Home => {
            state.input.move_home();
            None
        }
        KeyCode::Left => {
            state.input.move_left();
            None
        }
        KeyCode::Right => {
            state.input.move_right();
            None
        }
        KeyCode::Backspace => {
            state.input.backspace();
            None
        }
        KeyCode::Delete => {
            state.input.delete();
            None
        }
        KeyCode::Char(c) if !ctrl => {
            state.input.insert_char(c);
            None
        }
        _ => None,
    }
}
