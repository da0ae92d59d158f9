mod event_loop;

pub use event_loop::run;

use crate::components::{Footer, Header, Sidebar, Transcript};
use crate::conversation::{ControllerEvent, ConversationController, MeasureSource, ScrollDirective, Viewport};
use crate::event_handler::{EventHandler, KeyAction};
use crate::layout::TuiLayout;
use crate::signals::{Signal, SignalHub};
use crate::state::{AppState, InputState};
use crate::transcript::{TranscriptRenderer, content_width};

use askdocs_client::Backend;
use askdocs_core::{ChatConfig, ConversationError, Project};
use crossterm::event::Event;
use ratatui::{Frame, Terminal, backend::CrosstermBackend};
use std::io::{Result, Stdout};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{broadcast, mpsc};

/// Main TUI application
///
/// Owns the conversation controller and the receiving ends of its event
/// channel and of the shared signal hub.
pub struct App {
    state: AppState,
    controller: ConversationController,
    controller_rx: mpsc::UnboundedReceiver<ControllerEvent>,
    signals_rx: broadcast::Receiver<Signal>,
    snippet_max_chars: usize,
    viewport_height: u32,
    content_height: u32,
}

impl App {
    pub fn new(backend: Arc<dyn Backend>, config: &ChatConfig, projects: Vec<Project>) -> Self {
        let signals = SignalHub::default();
        let signals_rx = signals.subscribe();
        let (controller, controller_rx) = ConversationController::new(backend, config, signals);
        Self {
            state: AppState::new(projects),
            controller,
            controller_rx,
            signals_rx,
            snippet_max_chars: config.snippet_max_chars,
            viewport_height: 0,
            content_height: 0,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut AppState {
        &mut self.state
    }

    pub fn controller(&self) -> &ConversationController {
        &self.controller
    }

    /// Hub shared with other panels, e.g. a document panel
    pub fn signals(&self) -> SignalHub {
        self.controller.signals().clone()
    }

    pub fn should_exit(&self) -> bool {
        self.state.should_exit
    }

    /// Make the project with `id` the active one
    pub fn open_project(&mut self, id: &str) -> bool {
        let Some(project) = self.state.select_project(id).cloned() else {
            tracing::warn!(project = id, "unknown project");
            return false;
        };
        self.activate(project);
        true
    }

    fn activate(&mut self, project: Project) {
        self.state.reset_view();
        self.controller.activate_project(project);
    }

    pub fn handle_controller_event(&mut self, event: ControllerEvent) {
        match self.controller.handle_event(event) {
            Ok(()) => {}
            Err(ConversationError::Stale) => tracing::debug!("stale result discarded"),
            Err(e) => tracing::debug!(error = %e, "conversation error"),
        }
    }

    pub fn handle_signal(&mut self, signal: Signal) {
        if let Signal::ProjectUpdated(project) = &signal {
            self.state.update_project(project.clone());
        }
        self.controller.handle_signal(signal);
    }

    pub fn handle_terminal_event(&mut self, event: Event) {
        if let Event::Resize(..) = event {
            self.controller.scroll_mut().content_changed();
            return;
        }
        if let Some(action) = EventHandler::handle_event(&event, &mut self.state) {
            self.perform(action);
        }
    }

    /// Evaluate a deferred viewport measurement
    pub fn tick(&mut self, now: Instant) {
        self.controller.scroll_mut().tick(now);
    }

    pub fn perform(&mut self, action: KeyAction) {
        if action.is_user_scroll() {
            self.user_scroll(&action);
            return;
        }

        match action {
            KeyAction::SendMessage { message } => {
                if self.controller.send_message(&message).is_err() {
                    self.state.input = InputState::with_text(message);
                }
            }
            KeyAction::SubmitRename { name } => {
                if let Err(e) = self.controller.rename_project(&name) {
                    tracing::debug!(error = %e, "rename refused");
                }
            }
            KeyAction::JumpToBottom => self.controller.jump_to_bottom(),
            KeyAction::FocusNextCited => self.state.focus_next(&self.controller.log().cited_indices()),
            KeyAction::FocusPrevCited => self.state.focus_prev(&self.controller.log().cited_indices()),
            KeyAction::ToggleSources => {
                if let Some(key) = self.target_message().and_then(|i| self.controller.log().key_of(i)) {
                    self.controller.toggle_citation_expansion(key);
                }
            }
            KeyAction::NextCitation => self.move_citation(true),
            KeyAction::PrevCitation => self.move_citation(false),
            KeyAction::OpenCitation => {
                let selected = if self.state.focus.is_some() { self.state.citation } else { 0 };
                let document_id = self
                    .target_message()
                    .and_then(|i| self.controller.log().get(i))
                    .and_then(|m| m.citations.get(selected.min(m.citations.len().saturating_sub(1))))
                    .and_then(|c| c.document_id.clone());
                if let Some(document_id) = document_id {
                    self.controller.activate_citation(document_id);
                }
            }
            KeyAction::NextProject => {
                if let Some(project) = self.state.next_project().cloned() {
                    self.activate(project);
                }
            }
            KeyAction::ToggleSidebar => {
                self.state.sidebar_visible = !self.state.sidebar_visible;
                self.controller.scroll_mut().content_changed();
            }
            KeyAction::Quit => self.state.should_exit = true,
            KeyAction::ScrollUp
            | KeyAction::ScrollDown
            | KeyAction::PageUp
            | KeyAction::PageDown
            | KeyAction::ScrollTop => {}
        }
    }

    /// Focused message, else the latest one with citations
    fn target_message(&self) -> Option<usize> {
        self.state.focus.or_else(|| self.controller.log().cited_indices().last().copied())
    }

    /// Step the citation cursor of the target message
    ///
    /// Selecting past the first citation expands a collapsed sources list so
    /// the selection stays visible.
    fn move_citation(&mut self, forward: bool) {
        let Some(index) = self.target_message() else {
            return;
        };
        let count = self.controller.log().get(index).map_or(0, |m| m.citations.len());
        if self.state.focus != Some(index) {
            self.state.focus = Some(index);
            self.state.citation = if forward { 0 } else { count.saturating_sub(1) };
        } else if forward {
            self.state.next_citation(count);
        } else {
            self.state.prev_citation(count);
        }

        if self.state.citation > 0
            && let Some(key) = self.controller.log().key_of(index)
            && !self.controller.expansion().is_expanded(&key)
        {
            self.controller.toggle_citation_expansion(key);
        }
    }

    fn user_scroll(&mut self, action: &KeyAction) {
        let page = self.viewport_height.saturating_sub(1).max(1);
        let max_offset = self.content_height.saturating_sub(self.viewport_height);
        let offset = self.state.offset;
        self.state.offset = match action {
            KeyAction::ScrollUp => offset.saturating_sub(1),
            KeyAction::ScrollDown => offset.saturating_add(1),
            KeyAction::PageUp => offset.saturating_sub(page),
            KeyAction::PageDown => offset.saturating_add(page),
            KeyAction::ScrollTop => 0,
            _ => offset,
        }
        .min(max_offset);

        let viewport = Viewport::new(self.state.offset, self.viewport_height, self.content_height);
        self.controller.scroll_mut().measure(viewport, MeasureSource::User, Instant::now());
    }

    fn transcript_renderer(&self) -> TranscriptRenderer<'_> {
        TranscriptRenderer::new(self.controller.log(), self.controller.linker(), self.controller.expansion())
            .with_focus(self.state.focus)
            .with_selected_citation(Some(self.state.citation))
            .with_highlighted(self.controller.highlighted_document())
            .with_snippet_max_chars(self.snippet_max_chars)
    }

    /// Lay out and draw one frame
    ///
    /// A pending scroll-to-bottom directive is applied after the transcript
    /// is laid out; the resulting viewport is then measured as a layout pass.
    pub fn render(&mut self, frame: &mut Frame<'_>) {
        if let Some(focus) = self.state.focus
            && !self.controller.log().cited_indices().contains(&focus)
        {
            self.state.clear_focus();
        }

        let layout = TuiLayout::calculate(frame.area(), self.state.sidebar_visible);
        let area = layout.transcript;

        let lines = self.transcript_renderer().lines(content_width(area));
        self.content_height = lines.len() as u32;
        self.viewport_height = area.height as u32;
        let max_offset = self.content_height.saturating_sub(self.viewport_height);

        if self.controller.scroll_mut().take_directive() == Some(ScrollDirective::ScrollToBottom) {
            self.state.offset = max_offset;
        }
        self.state.offset = self.state.offset.min(max_offset);

        let viewport = Viewport::new(self.state.offset, self.viewport_height, self.content_height);
        self.controller.scroll_mut().measure(viewport, MeasureSource::Layout, Instant::now());

        Header::new(&self.controller).render(frame, layout.header);
        if layout.sidebar.is_some() {
            Sidebar::new(&self.state, &self.controller).render(frame, &layout);
        }

        let renderer = self.transcript_renderer();
        let offset = u16::try_from(self.state.offset).unwrap_or(u16::MAX);
        Transcript::new(&renderer, lines, offset)
            .with_jump_hint(self.controller.scroll().can_jump())
            .render(frame, area);

        Footer::new(&self.state, &self.controller).render(frame, &layout);
    }

    pub fn draw(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        terminal.draw(|frame| self.render(frame))?;
        Ok(())
    }
}
