//! Terminal client for asking questions about a project's documents.
//!
//! The [`conversation`] module holds the view logic and is independent of
//! the terminal; everything else is the ratatui shell around it.

pub mod app;
pub mod components;
pub mod conversation;
pub mod documents;
pub mod event_handler;
pub mod layout;
pub mod signals;
pub mod state;
pub mod theme;
pub mod transcript;

pub use app::App;
pub use conversation::{ControllerEvent, ConversationController, ConversationStatus};
pub use documents::DocumentPanel;
pub use event_handler::{EventHandler, KeyAction};
pub use signals::{Signal, SignalHub};
pub use state::{AppState, InputMode, InputState};
pub use theme::Theme;
pub use transcript::TranscriptRenderer;
