use ratatui::{
    style::Style,
    text::{Line, Span},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Text drawn in a single style
#[derive(Debug, Clone, PartialEq)]
pub(super) struct Run {
    pub text: String,
    pub style: Style,
}

impl Run {
    pub fn new(text: impl Into<String>, style: Style) -> Self {
        Self { text: text.into(), style }
    }
}

/// Wrap plain text to `width` columns, keeping blank lines
pub(super) fn wrap_plain(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return Vec::new();
    }
    let mut rows = Vec::new();
    for line in text.split('\n') {
        if line.trim().is_empty() {
            rows.push(String::new());
            continue;
        }
        rows.extend(textwrap::wrap(line, width).into_iter().map(|row| row.into_owned()));
    }
    rows
}

/// Greedy word wrap over styled runs
///
/// A word may span several runs. Whitespace at the start of a row is
/// dropped, and words wider than the row are split by character.
pub(super) fn wrap_runs(runs: &[Run], width: usize) -> Vec<Line<'static>> {
    if width == 0 {
        return Vec::new();
    }

    let mut rows: Vec<Vec<Span<'static>>> = Vec::new();
    let mut row: Vec<Span<'static>> = Vec::new();
    let mut row_width = 0usize;

    for token in tokens(runs) {
        let token_width: usize = token.pieces.iter().map(|(text, _)| text.width()).sum();

        if token.is_space {
            if row_width == 0 {
                continue;
            }
            if row_width + token_width > width {
                rows.push(std::mem::take(&mut row));
                row_width = 0;
                continue;
            }
            for (text, style) in token.pieces {
                push_span(&mut row, text, style);
            }
            row_width += token_width;
            continue;
        }

        if row_width + token_width > width && row_width > 0 && token_width <= width {
            rows.push(std::mem::take(&mut row));
            row_width = 0;
        }

        if row_width + token_width <= width {
            for (text, style) in token.pieces {
                push_span(&mut row, text, style);
            }
            row_width += token_width;
            continue;
        }

        for (text, style) in token.pieces {
            for ch in text.chars() {
                let ch_width = ch.width().unwrap_or(0);
                if row_width + ch_width > width && row_width > 0 {
                    rows.push(std::mem::take(&mut row));
                    row_width = 0;
                }
                push_span(&mut row, ch.to_string(), style);
                row_width += ch_width;
            }
        }
    }

    if !row.is_empty() {
        rows.push(row);
    }
    rows.into_iter().map(Line::from).collect()
}

/// A word or a stretch of whitespace
struct Token {
    pieces: Vec<(String, Style)>,
    is_space: bool,
}

fn tokens(runs: &[Run]) -> Vec<Token> {
    let mut tokens: Vec<Token> = Vec::new();
    for run in runs {
        for ch in run.text.chars() {
            let is_space = ch.is_whitespace();
            if tokens.last().is_none_or(|t| t.is_space != is_space) {
                tokens.push(Token { pieces: Vec::new(), is_space });
            }
            let Some(token) = tokens.last_mut() else {
                continue;
            };
            match token.pieces.last_mut() {
                Some((text, style)) if *style == run.style => text.push(ch),
                _ => token.pieces.push((ch.to_string(), run.style)),
            }
        }
    }
    tokens
}

fn push_span(row: &mut Vec<Span<'static>>, text: String, style: Style) {
    if let Some(last) = row.last_mut()
        && last.style == style
    {
        last.content.to_mut().push_str(&text);
        return;
    }
    row.push(Span::styled(text, style));
}
