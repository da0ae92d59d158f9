use crate::{theme::Theme, transcript::TranscriptRenderer};

use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::Stylize,
    text::{Line, Span},
    widgets::Paragraph,
};

const JUMP_HINT: &str = " ↓ End: jump to bottom ";

/// Scrolled transcript with the jump-to-bottom affordance
pub struct Transcript<'a> {
    renderer: &'a TranscriptRenderer<'a>,
    lines: Vec<Line<'static>>,
    offset: u16,
    show_jump: bool,
}

impl<'a> Transcript<'a> {
    pub fn new(renderer: &'a TranscriptRenderer<'a>, lines: Vec<Line<'static>>, offset: u16) -> Self {
        Self { renderer, lines, offset, show_jump: false }
    }

    /// Show the affordance while the user is scrolled away from new content
    pub fn with_jump_hint(mut self, show: bool) -> Self {
        self.show_jump = show;
        self
    }

    pub fn render(self, frame: &mut Frame<'_>, area: Rect) {
        let show_jump = self.show_jump;
        self.renderer.render(frame, area, self.lines, self.offset);

        if show_jump && area.height > 1 {
            let width = (JUMP_HINT.chars().count() as u16).min(area.width);
            let hint_area = Rect {
                x: area.x + area.width.saturating_sub(width + 1),
                y: area.y + area.height - 1,
                width,
                height: 1,
            };
            let hint = Paragraph::new(Line::from(Span::styled(JUMP_HINT, Theme::active().bold())))
                .alignment(Alignment::Right);
            frame.render_widget(hint, hint_area);
        }
    }
}
