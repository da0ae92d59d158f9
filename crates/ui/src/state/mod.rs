mod input;

pub use input::InputState;

use askdocs_core::Project;

/// What the footer input is editing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// Composing a question
    #[default]
    Chat,
    /// Editing the active project's name
    Rename,
}

/// Shell state that is not part of the conversation itself
#[derive(Debug, Clone)]
pub struct AppState {
    pub projects: Vec<Project>,
    pub project_index: Option<usize>,
    pub input: InputState,
    pub rename: InputState,
    pub mode: InputMode,
    /// Message focused for expansion and citation activation
    pub focus: Option<usize>,
    /// Citation selected within the focused message
    pub citation: usize,
    /// Rows scrolled from the top of the transcript
    pub offset: u32,
    pub sidebar_visible: bool,
    pub should_exit: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl AppState {
    pub fn new(projects: Vec<Project>) -> Self {
        Self {
            projects,
            project_index: None,
            input: InputState::new(),
            rename: InputState::new(),
            mode: InputMode::Chat,
            focus: None,
            citation: 0,
            offset: 0,
            sidebar_visible: true,
            should_exit: false,
        }
    }

    pub fn active_project(&self) -> Option<&Project> {
        self.project_index.and_then(|i| self.projects.get(i))
    }

    /// Select the project with `id`; returns it when found
    pub fn select_project(&mut self, id: &str) -> Option<&Project> {
        let index = self.projects.iter().position(|p| p.id.as_str() == id)?;
        self.project_index = Some(index);
        self.projects.get(index)
    }

    /// Advance to the next project, wrapping around
    pub fn next_project(&mut self) -> Option<&Project> {
        if self.projects.is_empty() {
            return None;
        }
        let next = self.project_index.map_or(0, |i| (i + 1) % self.projects.len());
        self.project_index = Some(next);
        self.projects.get(next)
    }

    /// Replace a project entry after it was updated elsewhere
    pub fn update_project(&mut self, project: Project) {
        if let Some(existing) = self.projects.iter_mut().find(|p| p.id == project.id) {
            *existing = project;
        }
    }

    /// Move focus to the next of `candidates` (ascending message indices)
    pub fn focus_next(&mut self, candidates: &[usize]) {
        self.citation = 0;
        self.focus = match self.focus {
            None => candidates.first().copied(),
            Some(current) => candidates
                .iter()
                .copied()
                .find(|&i| i > current)
                .or_else(|| candidates.first().copied()),
        };
    }

    pub fn focus_prev(&mut self, candidates: &[usize]) {
        self.citation = 0;
        self.focus = match self.focus {
            None => candidates.last().copied(),
            Some(current) => candidates
                .iter()
                .rev()
                .copied()
                .find(|&i| i < current)
                .or_else(|| candidates.last().copied()),
        };
    }

    /// Advance the citation cursor among `count` citations, wrapping
    pub fn next_citation(&mut self, count: usize) {
        self.citation = if count == 0 { 0 } else { (self.citation.min(count - 1) + 1) % count };
    }

    pub fn prev_citation(&mut self, count: usize) {
        self.citation = if count == 0 { 0 } else { (self.citation.min(count - 1) + count - 1) % count };
    }

    pub fn clear_focus(&mut self) {
        self.focus = None;
        self.citation = 0;
    }

    pub fn start_rename(&mut self) {
        let name = self.active_project().map(|p| p.name.clone()).unwrap_or_default();
        self.rename = InputState::with_text(name);
        self.mode = InputMode::Rename;
    }

    pub fn cancel_rename(&mut self) {
        self.rename.clear();
        self.mode = InputMode::Chat;
    }

    /// Forget per-conversation shell state
    pub fn reset_view(&mut self) {
        self.clear_focus();
        self.offset = 0;
    }
}
