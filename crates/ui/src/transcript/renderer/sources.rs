use super::wrap::wrap_plain;
use crate::theme::Theme;

use askdocs_core::{Citation, Message};
use ratatui::{
    style::{Style, Stylize},
    text::{Line, Span},
};

/// Shorten `text` to `max_chars` characters, ending with an ellipsis
pub(super) fn shorten(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let head: String = text.chars().take(max_chars).collect();
    format!("{}...", head.trim_end())
}

impl<'a> super::TranscriptRenderer<'a> {
    /// Sources list under an assistant answer
    ///
    /// Collapsed lists show the first citation and how many are hidden.
    pub(super) fn render_sources(
        &self, index: usize, message: &Message, width: usize, lines: &mut Vec<Line<'static>>,
    ) {
        let labels = self.linker.labels(&message.citations);
        let selected = self.selected_in(index);
        let expanded = self
            .log
            .key_of(index)
            .is_some_and(|key| self.expansion.is_expanded(&key));

        lines.push(Line::from(Span::styled(
            format!("  Sources ({})", message.citations.len()),
            Theme::muted().bold(),
        )));

        if !expanded {
            if let (Some(citation), Some(label)) = (message.citations.first(), labels.first()) {
                let mut line = self.source_line(1, citation, &label.text, selected == Some(0));
                let hidden = message.citations.len() - 1;
                if hidden > 0 {
                    line.spans.push(Span::styled(format!("  +{} more (Ctrl-E)", hidden), Theme::muted()));
                }
                lines.push(line);
            }
            return;
        }

        for (position, (citation, label)) in message.citations.iter().zip(&labels).enumerate() {
            lines.push(self.source_line(position + 1, citation, &label.text, selected == Some(position)));
            if let Some(snippet) = citation.snippet.as_deref().filter(|s| !s.trim().is_empty()) {
                let snippet = shorten(snippet.trim(), self.snippet_max_chars);
                for row in wrap_plain(&snippet, width.saturating_sub(6)) {
                    lines.push(Line::from(vec![
                        Span::raw("      "),
                        Span::styled(row, Theme::muted().italic()),
                    ]));
                }
            }
        }
    }

    fn source_line(&self, ordinal: usize, citation: &Citation, label: &str, selected: bool) -> Line<'static> {
        let highlighted = citation.document_id.is_some() && citation.document_id.as_ref() == self.highlighted;
        let label_style = if selected {
            Theme::reference_selected()
        } else if highlighted {
            Theme::reference_highlighted()
        } else {
            Style::default().fg(Theme::CYAN)
        };
        let cursor = if selected { "› " } else { "  " };

        let mut spans = vec![
            Span::styled(format!("{}[{}] ", cursor, ordinal), Theme::muted()),
            Span::styled(label.to_string(), label_style),
        ];
        if let Some(page) = citation.page {
            spans.push(Span::styled(format!(" · p. {}", page), Theme::muted()));
        }
        Line::from(spans)
    }
}
