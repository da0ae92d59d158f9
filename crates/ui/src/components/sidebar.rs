use crate::{conversation::ConversationController, layout::TuiLayout, state::AppState, theme::Theme};

use ratatui::{
    Frame,
    layout::Rect,
    style::{Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

/// Projects and the active project's documents
///
/// The document a citation was last activated for is highlighted.
pub struct Sidebar<'a> {
    state: &'a AppState,
    controller: &'a ConversationController,
}

impl<'a> Sidebar<'a> {
    pub fn new(state: &'a AppState, controller: &'a ConversationController) -> Self {
        Self { state, controller }
    }

    pub fn project_lines(&self) -> Vec<Line<'static>> {
        if self.state.projects.is_empty() {
            return vec![Line::from(Span::styled("No projects", Theme::muted()))];
        }
        self.state
            .projects
            .iter()
            .enumerate()
            .map(|(i, project)| {
                if Some(i) == self.state.project_index {
                    Line::from(Span::styled(format!("▸ {}", project.name), Theme::active().bold()))
                } else {
                    Line::from(Span::styled(format!("  {}", project.name), Theme::panel()))
                }
            })
            .collect()
    }

    pub fn document_lines(&self) -> Vec<Line<'static>> {
        let Some(documents) = self.controller.documents() else {
            let hint = if self.controller.project().is_some() { "Loading..." } else { "" };
            return vec![Line::from(Span::styled(hint, Theme::muted()))];
        };
        if documents.is_empty() {
            return vec![Line::from(Span::styled("No documents", Theme::muted()))];
        }

        let highlighted = self.controller.highlighted_document();
        documents
            .iter()
            .map(|doc| {
                let name_style =
                    if Some(&doc.id) == highlighted { Theme::reference_highlighted() } else { Theme::panel() };
                let mut spans = vec![Span::styled(doc.filename.clone(), name_style)];
                if !doc.status.is_empty() {
                    spans.push(Span::styled(
                        format!(" {}", doc.status),
                        Style::default().fg(Theme::document_status_color(&doc.status)).bg(Theme::PANEL_BG),
                    ));
                }
                Line::from(spans)
            })
            .collect()
    }

    pub fn render(&self, frame: &mut Frame<'_>, layout: &TuiLayout) {
        let Some((projects_area, documents_area)) = layout.sidebar_sections(self.state.projects.len().max(1) as u16)
        else {
            return;
        };
        self.render_section(frame, projects_area, "Projects", self.project_lines());
        self.render_section(frame, documents_area, "Documents", self.document_lines());
    }

    fn render_section(&self, frame: &mut Frame<'_>, area: Rect, title: &str, lines: Vec<Line<'static>>) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::border())
            .title(Span::styled(format!(" {} ", title), Style::default().fg(Theme::MUTED)))
            .style(Theme::panel());
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }
}
