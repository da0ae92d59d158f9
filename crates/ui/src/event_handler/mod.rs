mod chat_mode;
mod key_action;
mod rename_mode;

pub use key_action::KeyAction;

use crate::state::{AppState, InputMode};

use crossterm::event::{Event, KeyEvent, KeyEventKind};
use std::time::Duration;

use self::{chat_mode::handle_chat_key, rename_mode::handle_rename_key};

/// Terminal input for the shell
pub struct EventHandler;

impl EventHandler {
    /// Read a single event if one is ready
    ///
    /// Terminal errors are logged and swallowed; the loop keeps polling.
    pub fn read() -> Option<Event> {
        match crossterm::event::poll(Duration::ZERO) {
            Ok(true) => match crossterm::event::read() {
                Ok(event) => Some(event),
                Err(e) => {
                    tracing::warn!(error = %e, "terminal read failed");
                    None
                }
            },
            Ok(false) => None,
            Err(e) => {
                tracing::warn!(error = %e, "terminal poll failed");
                None
            }
        }
    }

    pub fn handle_key_event(event: KeyEvent, state: &mut AppState) -> Option<KeyAction> {
        if event.kind != KeyEventKind::Press {
            return None;
        }
        match state.mode {
            InputMode::Chat => handle_chat_key(event, state),
            InputMode::Rename => handle_rename_key(event, state),
        }
    }

    pub fn handle_event(event: &Event, state: &mut AppState) -> Option<KeyAction> {
        match event {
            Event::Key(key_event) => Self::handle_key_event(*key_event, state),
            _ => None,
        }
    }
}
