/// Actions the app performs in response to key events
///
/// Pure input editing happens inside the handler; everything that reaches
/// the conversation view, the viewport or the project list comes back as one
/// of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    SendMessage { message: String },
    SubmitRename { name: String },
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    ScrollTop,
    JumpToBottom,
    /// Focus the next message that carries citations
    FocusNextCited,
    FocusPrevCited,
    /// Expand or collapse the sources of the focused message
    ToggleSources,
    /// Move the citation cursor within the focused message
    NextCitation,
    PrevCitation,
    /// Follow the citation under the cursor to its document
    OpenCitation,
    NextProject,
    ToggleSidebar,
    Quit,
}

impl KeyAction {
    /// Whether the action moves the transcript viewport by user intent
    pub fn is_user_scroll(&self) -> bool {
        matches!(self, Self::ScrollUp | Self::ScrollDown | Self::PageUp | Self::PageDown | Self::ScrollTop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_scroll_actions() {
        assert!(KeyAction::PageUp.is_user_scroll());
        assert!(KeyAction::ScrollTop.is_user_scroll());
        assert!(!KeyAction::JumpToBottom.is_user_scroll());
        assert!(!KeyAction::SendMessage { message: "hi".into() }.is_user_scroll());
    }
}
