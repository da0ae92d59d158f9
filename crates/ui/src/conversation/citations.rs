//! Inline citation markers for assistant answers.
//!
//! Linking never rewrites the answer: every marker remembers the exact text
//! it stands in for, so [`LinkedText::source_text`] always reproduces the
//! input.

use askdocs_core::{Citation, DocumentId};
use regex::Regex;

/// Longest label shown before it is shortened
pub const DEFAULT_LABEL_MAX_CHARS: usize = 60;

const ELLIPSIS: &str = "...";
const FALLBACK_LABEL: &str = "source";

/// Piece of a linked answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Reference(Reference),
    LineBreak,
}

/// Inline marker bound to one citation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// Position of the citation in the message's citation list
    pub citation: usize,
    pub document_id: Option<DocumentId>,
    /// Label of the citation as shown in the sources list
    pub label: String,
    /// Text of the answer this marker replaces
    pub matched: String,
}

/// Answer text split into plain text, reference markers and line breaks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkedText {
    segments: Vec<Segment>,
}

impl LinkedText {
    /// Text without any markers
    pub fn plain(text: &str) -> Self {
        Self { segments: split_lines(vec![Piece::Text(text.to_string())]) }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn references(&self) -> impl Iterator<Item = &Reference> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Reference(reference) => Some(reference),
            _ => None,
        })
    }

    /// Whether the citation at `index` received an inline marker
    pub fn is_linked(&self, index: usize) -> bool {
        self.references().any(|r| r.citation == index)
    }

    /// Reassemble the original text
    pub fn source_text(&self) -> String {
        let mut text = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(t) => text.push_str(t),
                Segment::Reference(r) => text.push_str(&r.matched),
                Segment::LineBreak => text.push('\n'),
            }
        }
        text
    }
}

/// Display label of a citation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CitationLabel {
    /// Text shown in the sources list
    pub text: String,
    /// Untruncated title, tried when the shortened label is not found
    pub full: String,
}

#[derive(Debug, Clone)]
enum Piece {
    Text(String),
    Reference(Reference),
}

/// Maps answer text and its citations to [`LinkedText`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CitationLinker {
    max_chars: usize,
}

impl Default for CitationLinker {
    fn default() -> Self {
        Self::new(DEFAULT_LABEL_MAX_CHARS)
    }
}

impl CitationLinker {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars: max_chars.max(ELLIPSIS.len() + 2) }
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// Characters kept when a label is shortened
    fn keep(&self) -> usize {
        self.max_chars - ELLIPSIS.len() - 1
    }

    /// Label of a single citation, ignoring its neighbours
    pub fn label(&self, citation: &Citation) -> CitationLabel {
        let full = citation
            .title()
            .map(str::to_string)
            .or_else(|| citation.document_id.as_ref().map(|id| id.to_string()))
            .unwrap_or_else(|| FALLBACK_LABEL.to_string());

        let text = if full.chars().count() > self.max_chars { cut(&full, self.keep()) } else { full.clone() };
        CitationLabel { text, full }
    }

    /// Labels for every citation of a message, in order
    ///
    /// A label equal to an earlier one is cut at a later position when the
    /// titles differ, otherwise suffixed with the page or an ordinal.
    pub fn labels(&self, citations: &[Citation]) -> Vec<CitationLabel> {
        let mut labels: Vec<CitationLabel> = Vec::with_capacity(citations.len());
        for citation in citations {
            let mut label = self.label(citation);
            if labels.iter().any(|l| l.text == label.text) {
                label.text = self.disambiguate(&label, citation, &labels);
            }
            labels.push(label);
        }
        labels
    }

    fn disambiguate(&self, label: &CitationLabel, citation: &Citation, earlier: &[CitationLabel]) -> String {
        let taken = |candidate: &str| earlier.iter().any(|l| l.text == candidate);

        if !earlier.iter().any(|l| l.full == label.full) {
            let total = label.full.chars().count();
            for keep in self.keep() + 1..=total {
                let candidate = cut(&label.full, keep);
                if !taken(&candidate) {
                    return candidate;
                }
            }
        }

        if let Some(page) = citation.page {
            let candidate = format!("{} (p. {})", label.text, page);
            if !taken(&candidate) {
                return candidate;
            }
        }

        let mut ordinal = earlier.iter().filter(|l| l.full == label.full).count() + 1;
        loop {
            let candidate = format!("{} #{}", label.text, ordinal);
            if !taken(&candidate) {
                return candidate;
            }
            ordinal += 1;
        }
    }

    /// Replace the first occurrence of each citation's label with a marker
    ///
    /// The shortened label is searched first, then the full title. Labels
    /// changed to tell citations apart are only used for display.
    pub fn link(&self, text: &str, citations: &[Citation]) -> LinkedText {
        let labels = self.labels(citations);
        let mut pieces = vec![Piece::Text(text.to_string())];

        for (index, (citation, label)) in citations.iter().zip(&labels).enumerate() {
            let CitationLabel { text: short, full } = self.label(citation);
            let fallback = (full != short).then_some(full.as_str());
            for locator in std::iter::once(short.as_str()).chain(fallback) {
                let reference = Reference {
                    citation: index,
                    document_id: citation.document_id.clone(),
                    label: label.text.clone(),
                    matched: String::new(),
                };
                if link_first(&mut pieces, locator, reference) {
                    break;
                }
            }
        }

        LinkedText { segments: split_lines(pieces) }
    }
}

/// First `keep` characters, trailing whitespace trimmed, with an ellipsis
fn cut(title: &str, keep: usize) -> String {
    if title.chars().count() <= keep {
        return title.to_string();
    }
    let head: String = title.chars().take(keep).collect();
    format!("{}{}", head.trim_end(), ELLIPSIS)
}

fn link_first(pieces: &mut Vec<Piece>, locator: &str, mut reference: Reference) -> bool {
    if locator.is_empty() {
        return false;
    }
    let pattern = match Regex::new(&regex::escape(locator)) {
        Ok(pattern) => pattern,
        Err(e) => {
            tracing::warn!(error = %e, "citation label cannot be matched");
            return false;
        }
    };

    for i in 0..pieces.len() {
        let Piece::Text(text) = &pieces[i] else {
            continue;
        };
        let Some(found) = pattern.find(text) else {
            continue;
        };

        let before = text[..found.start()].to_string();
        let after = text[found.end()..].to_string();
        reference.matched = found.as_str().to_string();

        let mut replacement = Vec::with_capacity(3);
        if !before.is_empty() {
            replacement.push(Piece::Text(before));
        }
        replacement.push(Piece::Reference(reference));
        if !after.is_empty() {
            replacement.push(Piece::Text(after));
        }
        pieces.splice(i..=i, replacement);
        return true;
    }
    false
}

fn split_lines(pieces: Vec<Piece>) -> Vec<Segment> {
    let mut segments = Vec::new();
    for piece in pieces {
        match piece {
            Piece::Reference(reference) => segments.push(Segment::Reference(reference)),
            Piece::Text(text) => {
                for (i, line) in text.split('\n').enumerate() {
                    if i > 0 {
                        segments.push(Segment::LineBreak);
                    }
                    if !line.is_empty() {
                        segments.push(Segment::Text(line.to_string()));
                    }
                }
            }
        }
    }
    segments
}
