use crate::{
    conversation::ConversationController,
    layout::TuiLayout,
    state::{AppState, InputMode},
    theme::Theme,
};

use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

/// Input composer, notice line and key hints
///
/// - Row 1: separator
/// - Row 2: question input, or the rename prompt
/// - Row 3: guidance from the conversation view
pub struct Footer<'a> {
    state: &'a AppState,
    controller: &'a ConversationController,
}

impl<'a> Footer<'a> {
    pub fn new(state: &'a AppState, controller: &'a ConversationController) -> Self {
        Self { state, controller }
    }

    pub fn input_line(&self) -> Line<'static> {
        let cursor = Span::styled("█", Style::default().fg(Theme::FG));
        let (prompt, input) = match self.state.mode {
            InputMode::Chat => (Span::styled("› ", Style::default().fg(Theme::BLUE)), &self.state.input),
            InputMode::Rename => (Span::styled("Rename project: ", Style::default().fg(Theme::YELLOW)), &self.state.rename),
        };

        if self.state.mode == InputMode::Chat && input.is_empty() {
            let placeholder = if self.controller.input_enabled() {
                "Ask a question about your documents..."
            } else {
                "Chat input is disabled"
            };
            return Line::from(vec![prompt, cursor, Span::styled(placeholder, Theme::muted())]);
        }

        let (before, after) = input.split_at_cursor();
        Line::from(vec![
            prompt,
            Span::styled(before.to_string(), Theme::base()),
            cursor,
            Span::styled(after.to_string(), Theme::base()),
        ])
    }

    pub fn notice_line(&self) -> Line<'static> {
        match self.controller.notice() {
            Some(notice) => Line::from(Span::styled(notice, Theme::warning())),
            None => Line::default(),
        }
    }

    fn hint_lines(&self) -> Vec<Line<'static>> {
        let key = |k: &'static str| Span::styled(k, Style::default().fg(Theme::BLUE));
        let label = |l: &'static str| Span::styled(l, Theme::muted());
        match self.state.mode {
            InputMode::Chat => vec![
                Line::from(vec![key("Enter"), label(" send  "), key("F2"), label(" rename")]),
                Line::from(vec![key("Ctrl-N"), label(" project  "), key("^C"), label(" quit")]),
            ],
            InputMode::Rename => vec![
                Line::from(vec![key("Enter"), label(" save")]),
                Line::from(vec![key("Esc"), label(" cancel")]),
            ],
        }
    }

    pub fn render(&self, frame: &mut Frame<'_>, layout: &TuiLayout) {
        let (input_area, hints_area) = layout.footer_sections();
        frame.render_widget(Block::default().style(Theme::base()), layout.footer);

        let block = Block::default().borders(Borders::TOP).border_style(Theme::border());
        let inner = block.inner(input_area);
        frame.render_widget(block, input_area);
        frame.render_widget(Paragraph::new(vec![self.input_line(), self.notice_line()]), inner);

        if let Some(hints_area) = hints_area {
            let block = Block::default().borders(Borders::TOP).border_style(Theme::border());
            let inner: Rect = block.inner(hints_area);
            frame.render_widget(block, hints_area);
            frame.render_widget(Paragraph::new(self.hint_lines()).alignment(Alignment::Right).italic(), inner);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::SignalHub;
    use askdocs_client::MockBackend;
    use askdocs_core::{ChatConfig, Project, ProjectId};
    use std::sync::Arc;

    fn text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn controller() -> ConversationController {
        ConversationController::new(Arc::new(MockBackend::new()), &ChatConfig::default(), SignalHub::default()).0
    }

    #[tokio::test]
    async fn test_disabled_placeholder_and_guidance() {
        let state = AppState::default();
        let controller = controller();
        let footer = Footer::new(&state, &controller);
        assert!(text(&footer.input_line()).contains("disabled"));
        assert_eq!(text(&footer.notice_line()), "Pick a project to start.");
    }

    #[tokio::test]
    async fn test_cursor_splits_input() {
        let mut state = AppState::default();
        state.input = crate::state::InputState::with_text("refunds?");
        state.input.move_left();
        let controller = controller();
        assert_eq!(text(&Footer::new(&state, &controller).input_line()), "› refunds█?");
    }

    #[tokio::test]
    async fn test_rename_prompt() {
        let mut state = AppState::new(vec![Project {
            id: ProjectId::new("p1"),
            name: "Policies".into(),
            description: String::new(),
        }]);
        state.select_project("p1");
        state.start_rename();
        let controller = controller();
        assert_eq!(text(&Footer::new(&state, &controller).input_line()), "Rename project: Policies█");
    }
}
