use crate::{conversation::ConversationController, theme::Theme};

use ratatui::{
    Frame,
    layout::Rect,
    style::{Style, Stylize},
    text::{Line, Span},
    widgets::Paragraph,
};

/// One-line header: project name, document count and conversation status
pub struct Header<'a> {
    controller: &'a ConversationController,
}

impl<'a> Header<'a> {
    pub fn new(controller: &'a ConversationController) -> Self {
        Self { controller }
    }

    pub fn line(&self) -> Line<'static> {
        let separator = || Span::styled(" │ ", Style::default().fg(Theme::BORDER));
        let mut spans = vec![Span::styled(" askdocs", Style::default().fg(Theme::PURPLE).bold())];

        spans.push(separator());
        match self.controller.project() {
            Some(project) => spans.push(Span::styled(project.name.clone(), Style::default().fg(Theme::BLUE))),
            None => spans.push(Span::styled("no project", Style::default().fg(Theme::MUTED))),
        }

        if let Some(count) = self.controller.document_count() {
            spans.push(separator());
            let label = if count == 1 { "1 document".to_string() } else { format!("{} documents", count) };
            spans.push(Span::styled(label, Style::default().fg(Theme::MUTED)));
        }

        let status = self.controller.status().label();
        spans.push(separator());
        spans.push(Span::styled(status, Style::default().fg(Theme::status_color(status))));
        Line::from(spans)
    }

    pub fn render(&self, frame: &mut Frame<'_>, area: Rect) {
        frame.render_widget(Paragraph::new(self.line()).style(Theme::panel()), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::SignalHub;
    use askdocs_client::MockBackend;
    use askdocs_core::ChatConfig;
    use std::sync::Arc;

    fn text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[tokio::test]
    async fn test_header_without_project() {
        let (controller, _rx) =
            ConversationController::new(Arc::new(MockBackend::new()), &ChatConfig::default(), SignalHub::default());
        let line = text(&Header::new(&controller).line());
        assert!(line.contains("no project"));
        assert!(!line.contains("documents"));
    }
}
