use ratatui::style::{Color, Modifier, Style};

/// Iceberg-inspired color theme for the AskDocs terminal client
///
/// Bluish dark palette based on iceberg.vim (https://github.com/cocopon/iceberg.vim).
#[derive(Debug, Clone, Copy)]
pub struct Theme;

impl Theme {
    /// Primary background
    pub const BG: Color = Color::Rgb(22, 24, 33);

    /// Primary text
    pub const FG: Color = Color::Rgb(198, 200, 209);

    /// Panels, sidebar, input card
    pub const PANEL_BG: Color = Color::Rgb(30, 33, 50);

    /// Selection and focus
    pub const ACTIVE: Color = Color::Rgb(39, 44, 66);

    pub const BLUE: Color = Color::Rgb(132, 160, 198);
    pub const CYAN: Color = Color::Rgb(137, 184, 194);
    pub const PURPLE: Color = Color::Rgb(160, 147, 199);
    pub const GREEN: Color = Color::Rgb(180, 190, 130);
    pub const YELLOW: Color = Color::Rgb(226, 164, 120);
    pub const RED: Color = Color::Rgb(226, 120, 120);
    pub const MUTED: Color = Color::Rgb(107, 112, 137);
    pub const BORDER: Color = Color::Rgb(60, 65, 90);

    pub fn base() -> Style {
        Style::default().fg(Self::FG).bg(Self::BG)
    }

    pub fn muted() -> Style {
        Style::default().fg(Self::MUTED).bg(Self::BG)
    }

    pub fn panel() -> Style {
        Style::default().fg(Self::FG).bg(Self::PANEL_BG)
    }

    pub fn border() -> Style {
        Style::default().fg(Self::BORDER)
    }

    pub fn active() -> Style {
        Style::default().fg(Self::FG).bg(Self::ACTIVE)
    }

    pub fn error() -> Style {
        Style::default().fg(Self::RED).bg(Self::BG)
    }

    pub fn warning() -> Style {
        Style::default().fg(Self::YELLOW).bg(Self::BG)
    }

    /// Inline citation marker
    pub fn reference() -> Style {
        Style::default()
            .fg(Self::CYAN)
            .bg(Self::BG)
            .add_modifier(Modifier::UNDERLINED)
    }

    /// Citation marker pointing at the highlighted document
    pub fn reference_highlighted() -> Style {
        Self::reference().bg(Self::ACTIVE).add_modifier(Modifier::BOLD)
    }

    /// Citation under the cursor of the focused message
    pub fn reference_selected() -> Style {
        Self::reference().fg(Self::YELLOW).add_modifier(Modifier::BOLD)
    }

    /// Color of a conversation status label
    pub fn status_color(status: &str) -> Color {
        match status {
            "ready" => Self::GREEN,
            "opening" | "answering" => Self::CYAN,
            "unavailable" => Self::RED,
            _ => Self::MUTED,
        }
    }

    /// Color of a document ingestion status
    pub fn document_status_color(status: &str) -> Color {
        match status {
            "ready" | "processed" | "done" => Self::GREEN,
            "queued" | "processing" | "pending" => Self::YELLOW,
            "failed" | "error" => Self::RED,
            _ => Self::MUTED,
        }
    }
}
