use super::wrap::{Run, wrap_plain, wrap_runs};
use crate::conversation::Segment;
use crate::theme::Theme;

use askdocs_core::Message;
use ratatui::{
    style::{Color, Style, Stylize},
    text::{Line, Span},
};

impl<'a> super::TranscriptRenderer<'a> {
    pub(super) fn render_user_message(&self, message: &Message, width: usize, lines: &mut Vec<Line<'static>>) {
        lines.push(Line::from(vec![
            Span::styled("● ", Style::default().fg(Theme::BLUE)),
            Span::styled("You", Style::default().fg(Theme::BLUE).bold()),
        ]));
        self.render_accent_bar(&message.text, Theme::BLUE, width, lines);
    }

    fn render_accent_bar(&self, content: &str, accent: Color, width: usize, lines: &mut Vec<Line<'static>>) {
        let bar = Span::styled("┃ ", Style::default().fg(accent).bg(Theme::BG));
        for row in wrap_plain(content, width.saturating_sub(2)) {
            lines.push(Line::from(vec![bar.clone(), Span::styled(row, Theme::base())]));
        }
    }

    fn assistant_header(&self, index: usize, color: Color) -> Line<'static> {
        let mut spans = vec![
            Span::styled("◆ ", Style::default().fg(color)),
            Span::styled("Assistant", Style::default().fg(color).bold()),
        ];
        if self.focused == Some(index) {
            spans.push(Span::styled("  ◂ focused", Theme::muted()));
        }
        Line::from(spans)
    }

    pub(super) fn render_assistant_message(
        &self, index: usize, message: &Message, width: usize, lines: &mut Vec<Line<'static>>,
    ) {
        lines.push(self.assistant_header(index, Theme::CYAN));

        let linked = self.linker.link(&message.text, &message.citations);
        let selected = self.selected_in(index);
        let mut paragraph: Vec<Run> = Vec::new();
        for segment in linked.segments() {
            match segment {
                Segment::Text(text) => paragraph.push(Run::new(text.clone(), Theme::base())),
                Segment::Reference(reference) => {
                    let highlighted = reference.document_id.is_some() && reference.document_id.as_ref() == self.highlighted;
                    let style = if selected == Some(reference.citation) {
                        Theme::reference_selected()
                    } else if highlighted {
                        Theme::reference_highlighted()
                    } else {
                        Theme::reference()
                    };
                    paragraph.push(Run::new(reference.label.clone(), style));
                }
                Segment::LineBreak => {
                    self.flush_paragraph(&mut paragraph, width, lines);
                }
            }
        }
        self.flush_paragraph(&mut paragraph, width, lines);

        if message.has_citations() {
            self.render_sources(index, message, width, lines);
        }
    }

    fn flush_paragraph(&self, paragraph: &mut Vec<Run>, width: usize, lines: &mut Vec<Line<'static>>) {
        let runs = std::mem::take(paragraph);
        if runs.is_empty() {
            lines.push(Line::default());
            return;
        }
        lines.extend(wrap_runs(&runs, width));
    }

    pub(super) fn render_pending(&self, lines: &mut Vec<Line<'static>>) {
        lines.push(Line::from(vec![
            Span::styled("◆ ", Style::default().fg(Theme::MUTED)),
            Span::styled("Assistant", Style::default().fg(Theme::MUTED).bold()),
        ]));
        lines.push(Line::from(Span::styled("Thinking...", Theme::muted().italic())));
    }

    pub(super) fn render_failed(&self, message: &Message, width: usize, lines: &mut Vec<Line<'static>>) {
        lines.push(Line::from(vec![
            Span::styled("✗ ", Style::default().fg(Theme::RED)),
            Span::styled("Assistant", Style::default().fg(Theme::RED).bold()),
        ]));
        for row in wrap_plain(&message.text, width) {
            lines.push(Line::from(Span::styled(row, Theme::error())));
        }
    }

    pub(super) fn render_system_message(&self, message: &Message, width: usize, lines: &mut Vec<Line<'static>>) {
        lines.push(Line::from(vec![
            Span::styled("• ", Style::default().fg(Theme::MUTED)),
            Span::styled("System", Style::default().fg(Theme::MUTED).bold()),
        ]));
        self.render_accent_bar(&message.text, Theme::MUTED, width, lines);
    }
}
