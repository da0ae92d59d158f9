use ratatui::layout::{Constraint, Direction, Layout, Rect};

const SIDEBAR_WIDTH: u16 = 28;
const HINTS_WIDTH: u16 = 24;

/// Responsive breakpoints
///
/// - >= 100 cols: documents sidebar beside the transcript
/// - 72-99 cols: transcript only
/// - < 72 cols: transcript only, key hints folded away
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutMode {
    Full,
    Medium,
    Compact,
}

impl From<u16> for LayoutMode {
    fn from(width: u16) -> Self {
        match width {
            w if w >= 100 => Self::Full,
            w if w >= 72 => Self::Medium,
            _ => Self::Compact,
        }
    }
}

impl LayoutMode {
    pub fn has_sidebar(&self) -> bool {
        matches!(self, Self::Full)
    }

    pub fn has_hints(&self) -> bool {
        !matches!(self, Self::Compact)
    }
}

/// Areas of one frame
#[derive(Debug, Clone)]
pub struct TuiLayout {
    pub mode: LayoutMode,
    /// Project name, document count and status (1 line)
    pub header: Rect,
    pub transcript: Rect,
    /// Projects and documents, only in [`LayoutMode::Full`]
    pub sidebar: Option<Rect>,
    /// Input, notice and hints (3 lines)
    pub footer: Rect,
}

impl TuiLayout {
    pub fn calculate(area: Rect, sidebar_visible: bool) -> Self {
        let mode = LayoutMode::from(area.width);

        let [header, main, footer] = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0), Constraint::Length(3)])
            .areas(area);

        let (sidebar, transcript) = if sidebar_visible && mode.has_sidebar() {
            let [sidebar, transcript] = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
                .areas(main);
            (Some(sidebar), transcript)
        } else {
            (None, main)
        };

        Self { mode, header, transcript, sidebar, footer }
    }

    /// Input line and hints column of the footer
    pub fn footer_sections(&self) -> (Rect, Option<Rect>) {
        if !self.mode.has_hints() {
            return (self.footer, None);
        }
        let [input, hints] = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(HINTS_WIDTH)])
            .areas(self.footer);
        (input, Some(hints))
    }

    /// Projects above documents in the sidebar
    pub fn sidebar_sections(&self, project_rows: u16) -> Option<(Rect, Rect)> {
        self.sidebar.map(|area| {
            let [projects, documents] = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(project_rows.saturating_add(2)), Constraint::Min(0)])
                .areas(area);
            (projects, documents)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_mode_from_width() {
        assert_eq!(LayoutMode::from(120), LayoutMode::Full);
        assert_eq!(LayoutMode::from(100), LayoutMode::Full);
        assert_eq!(LayoutMode::from(99), LayoutMode::Medium);
        assert_eq!(LayoutMode::from(72), LayoutMode::Medium);
        assert_eq!(LayoutMode::from(71), LayoutMode::Compact);
    }

    #[test]
    fn test_full_layout_has_sidebar() {
        let layout = TuiLayout::calculate(Rect::new(0, 0, 100, 30), true);
        let sidebar = layout.sidebar.unwrap();
        assert_eq!(sidebar.width, SIDEBAR_WIDTH);
        assert_eq!(layout.transcript.width, 100 - SIDEBAR_WIDTH);
        assert_eq!(layout.header.height, 1);
        assert_eq!(layout.footer.height, 3);
    }

    #[test]
    fn test_sidebar_hidden_by_preference() {
        let layout = TuiLayout::calculate(Rect::new(0, 0, 100, 30), false);
        assert!(layout.sidebar.is_none());
        assert_eq!(layout.transcript.width, 100);
    }

    #[test]
    fn test_medium_layout() {
        let layout = TuiLayout::calculate(Rect::new(0, 0, 85, 30), true);
        assert!(layout.sidebar.is_none());
        let (input, hints) = layout.footer_sections();
        assert_eq!(hints.unwrap().width, HINTS_WIDTH);
        assert_eq!(input.width, 85 - HINTS_WIDTH);
    }

    #[test]
    fn test_compact_layout() {
        let layout = TuiLayout::calculate(Rect::new(0, 0, 40, 15), true);
        assert_eq!(layout.mode, LayoutMode::Compact);
        assert_eq!(layout.transcript.height, 11);
        let (input, hints) = layout.footer_sections();
        assert!(hints.is_none());
        assert_eq!(input, layout.footer);
    }

    #[test]
    fn test_sidebar_sections() {
        let layout = TuiLayout::calculate(Rect::new(0, 0, 120, 40), true);
        let (projects, documents) = layout.sidebar_sections(3).unwrap();
        assert_eq!(projects.height, 5);
        assert_eq!(documents.y, projects.y + 5);
    }
}
