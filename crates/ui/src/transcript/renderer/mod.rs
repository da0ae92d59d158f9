mod messages;
mod scrollbar;
mod sources;
mod wrap;

use crate::conversation::{CitationLinker, ExpansionState, MessageLog};
use crate::theme::Theme;

use askdocs_core::{DeliveryState, DocumentId, Role};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Paragraph},
};

const PADDING_X: u16 = 1;
const SCROLLBAR_WIDTH: u16 = 1;
const DEFAULT_SNIPPET_MAX_CHARS: usize = 140;

/// Columns available to message text inside `area`
pub fn content_width(area: Rect) -> usize {
    area.width.saturating_sub(PADDING_X * 2 + SCROLLBAR_WIDTH) as usize
}

/// Renders the message log to lines and onto a frame
pub struct TranscriptRenderer<'a> {
    log: &'a MessageLog,
    linker: &'a CitationLinker,
    expansion: &'a ExpansionState,
    focused: Option<usize>,
    /// Citation under the cursor, within the focused message
    selected: Option<usize>,
    highlighted: Option<&'a DocumentId>,
    snippet_max_chars: usize,
}

impl<'a> TranscriptRenderer<'a> {
    pub fn new(log: &'a MessageLog, linker: &'a CitationLinker, expansion: &'a ExpansionState) -> Self {
        Self {
            log,
            linker,
            expansion,
            focused: None,
            selected: None,
            highlighted: None,
            snippet_max_chars: DEFAULT_SNIPPET_MAX_CHARS,
        }
    }

    /// Mark the message at `index` as focused
    pub fn with_focus(mut self, index: Option<usize>) -> Self {
        self.focused = index;
        self
    }

    pub fn with_selected_citation(mut self, citation: Option<usize>) -> Self {
        self.selected = citation;
        self
    }

    /// Selected citation of the message at `index`, if it is focused
    fn selected_in(&self, index: usize) -> Option<usize> {
        if self.focused == Some(index) { self.selected } else { None }
    }

    pub fn with_highlighted(mut self, document_id: Option<&'a DocumentId>) -> Self {
        self.highlighted = document_id;
        self
    }

    pub fn with_snippet_max_chars(mut self, max_chars: usize) -> Self {
        self.snippet_max_chars = max_chars;
        self
    }

    /// Lay out every message for the given text width
    pub fn lines(&self, width: usize) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        if self.log.is_empty() {
            lines.push(Line::from(Span::styled(
                "No messages yet. Ask a question about this project's documents.",
                Theme::muted().italic(),
            )));
            return lines;
        }

        for (index, message) in self.log.all().iter().enumerate() {
            if index > 0 {
                lines.push(Line::default());
            }
            match (message.role, message.state) {
                (Role::User, _) => self.render_user_message(message, width, &mut lines),
                (Role::Assistant, DeliveryState::Pending) => self.render_pending(&mut lines),
                (Role::Assistant, DeliveryState::Failed) => self.render_failed(message, width, &mut lines),
                (Role::Assistant, _) => self.render_assistant_message(index, message, width, &mut lines),
                (Role::System, _) => self.render_system_message(message, width, &mut lines),
            }
        }
        lines
    }

    /// Draw pre-computed `lines` scrolled down by `offset` rows
    pub fn render(&self, frame: &mut Frame<'_>, area: Rect, lines: Vec<Line<'static>>, offset: u16) {
        let content_height = lines.len();
        let left_pad = Span::styled(" ", Style::default().bg(Theme::BG));

        let padded: Vec<Line<'static>> = lines
            .into_iter()
            .map(|line| {
                let mut spans = Vec::with_capacity(line.spans.len() + 1);
                spans.push(left_pad.clone());
                spans.extend(line.spans);
                Line::from(spans)
            })
            .collect();

        frame.render_widget(Block::default().style(Style::default().bg(Theme::BG)), area);
        frame.render_widget(Paragraph::new(Text::from(padded)).scroll((offset, 0)), area);
        self.render_scrollbar(frame, area, content_height, offset);
    }
}
