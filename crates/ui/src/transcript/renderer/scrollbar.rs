use crate::theme::Theme;

use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

impl<'a> super::TranscriptRenderer<'a> {
    /// Scroll position indicator on the right edge
    pub(super) fn render_scrollbar(&self, frame: &mut Frame<'_>, area: Rect, content_height: usize, offset: u16) {
        let visible = area.height as usize;
        if area.height <= 1 || content_height <= visible {
            return;
        }

        let max_offset = (content_height - visible) as f64;
        let ratio = (offset as f64 / max_offset).clamp(0.0, 1.0);
        let thumb = ((visible as f64 / content_height as f64) * visible as f64).ceil().max(1.0) as u16;
        let thumb_top = (ratio * (visible as u16).saturating_sub(thumb) as f64).round() as u16;

        let x = area.x + area.width.saturating_sub(1);
        for y in 0..area.height {
            let on_thumb = y >= thumb_top && y < thumb_top + thumb;
            let style = if on_thumb {
                Style::default().fg(Theme::BLUE).bg(Theme::BG)
            } else {
                Style::default().fg(Theme::BORDER).bg(Theme::BG)
            };
            frame.render_widget(
                Paragraph::new(Line::from(Span::styled("│", style))),
                Rect::new(x, area.y + y, 1, 1),
            );
        }
    }
}
