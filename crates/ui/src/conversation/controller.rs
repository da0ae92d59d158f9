use super::citations::{CitationLinker, LinkedText};
use super::log::{ExpansionState, MessageKey, MessageLog};
use super::scroll::ScrollFollow;
use super::session::{ConversationSession, OpenTicket, SendTicket};
use crate::signals::{Signal, SignalHub};

use askdocs_client::{Backend, DocumentStore, MessageExchange, ProjectDirectory};
use askdocs_core::{
    ChatConfig, ConversationError, ConversationSnapshot, Document, DocumentId, Project, ProjectId, ProjectPatch,
    Reply, Result, Role,
};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Results of background work, fed back through [`ConversationController::handle_event`]
#[derive(Debug)]
pub enum ControllerEvent {
    Opened { ticket: OpenTicket, result: Result<ConversationSnapshot> },
    Replied { ticket: SendTicket, result: Result<Reply> },
    DocumentsListed { project_id: ProjectId, result: Result<Vec<Document>> },
    Renamed { project_id: ProjectId, result: Result<Project> },
}

/// Coarse state shown in the header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationStatus {
    NoProject,
    Opening,
    Unavailable,
    Answering,
    Ready,
}

impl ConversationStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ConversationStatus::NoProject => "no project",
            ConversationStatus::Opening => "opening",
            ConversationStatus::Unavailable => "unavailable",
            ConversationStatus::Answering => "answering",
            ConversationStatus::Ready => "ready",
        }
    }
}

/// Drives one conversation view
///
/// Remote calls run on spawned tasks and report back as [`ControllerEvent`]s
/// on the channel returned by [`ConversationController::new`]; the owner
/// passes each event to [`ConversationController::handle_event`]. All log and
/// scroll mutations therefore happen on the owner's task. Work started for a
/// project is cancelled when another project is activated.
pub struct ConversationController {
    backend: Arc<dyn Backend>,
    session: ConversationSession,
    linker: CitationLinker,
    scroll: ScrollFollow,
    expansion: ExpansionState,
    signals: SignalHub,
    project: Option<Project>,
    documents: Option<Vec<Document>>,
    highlighted: Option<DocumentId>,
    notice: Option<String>,
    reopen_after_send: bool,
    events: mpsc::UnboundedSender<ControllerEvent>,
    cancel: CancellationToken,
}

impl ConversationController {
    pub fn new(
        backend: Arc<dyn Backend>, config: &ChatConfig, signals: SignalHub,
    ) -> (Self, mpsc::UnboundedReceiver<ControllerEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let controller = Self {
            backend,
            session: ConversationSession::new(),
            linker: CitationLinker::new(config.label_max_chars),
            scroll: ScrollFollow::from_config(config),
            expansion: ExpansionState::default(),
            signals,
            project: None,
            documents: None,
            highlighted: None,
            notice: None,
            reopen_after_send: false,
            events,
            cancel: CancellationToken::new(),
        };
        (controller, rx)
    }

    pub fn session(&self) -> &ConversationSession {
        &self.session
    }

    pub fn log(&self) -> &MessageLog {
        self.session.log()
    }

    pub fn linker(&self) -> &CitationLinker {
        &self.linker
    }

    pub fn scroll(&self) -> &ScrollFollow {
        &self.scroll
    }

    pub fn scroll_mut(&mut self) -> &mut ScrollFollow {
        &mut self.scroll
    }

    pub fn expansion(&self) -> &ExpansionState {
        &self.expansion
    }

    pub fn signals(&self) -> &SignalHub {
        &self.signals
    }

    pub fn project(&self) -> Option<&Project> {
        self.project.as_ref()
    }

    pub fn project_id(&self) -> Option<&ProjectId> {
        self.project.as_ref().map(|p| &p.id)
    }

    /// Documents of the active project, once listed
    pub fn documents(&self) -> Option<&[Document]> {
        self.documents.as_deref()
    }

    pub fn document_count(&self) -> Option<usize> {
        self.documents.as_ref().map(Vec::len)
    }

    pub fn highlighted_document(&self) -> Option<&DocumentId> {
        self.highlighted.as_ref()
    }

    pub fn status(&self) -> ConversationStatus {
        if self.project.is_none() {
            ConversationStatus::NoProject
        } else if self.session.is_opening() {
            ConversationStatus::Opening
        } else if self.session.is_sending() {
            ConversationStatus::Answering
        } else if self.session.is_open() {
            ConversationStatus::Ready
        } else {
            ConversationStatus::Unavailable
        }
    }

    /// Whether the chat input accepts messages
    pub fn input_enabled(&self) -> bool {
        self.session.is_open() && self.document_count() != Some(0)
    }

    /// Guidance or status line for the user
    pub fn notice(&self) -> Option<String> {
        if self.project.is_none() {
            return Some(ConversationError::NoProject.guidance());
        }
        if let Some(notice) = &self.notice {
            return Some(notice.clone());
        }
        if self.document_count() == Some(0) {
            return Some(ConversationError::NoDocuments.guidance());
        }
        None
    }

    /// Linked text of the message at `index`
    pub fn linked(&self, index: usize) -> Option<LinkedText> {
        let message = self.log().get(index)?;
        Some(if message.role == Role::Assistant && message.has_citations() {
            self.linker.link(&message.text, &message.citations)
        } else {
            LinkedText::plain(&message.text)
        })
    }

    fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ControllerEvent> + Send + 'static,
    {
        let events = self.events.clone();
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                event = task => {
                    let _ = events.send(event);
                }
            }
        });
    }

    /// Switch to `project`: drop everything of the previous one, then open
    /// its conversation and list its documents
    pub fn activate_project(&mut self, project: Project) {
        self.clear_active();
        tracing::info!(project = %project.id, name = %project.name, "project activated");
        self.project = Some(project);
        self.refresh_documents();
        self.open_conversation();
    }

    pub fn deactivate(&mut self) {
        if let Some(id) = self.project_id() {
            tracing::info!(project = %id, "project deactivated");
        }
        self.clear_active();
    }

    fn clear_active(&mut self) {
        self.cancel.cancel();
        self.cancel = CancellationToken::new();
        self.session.reset();
        self.expansion.clear();
        self.scroll.reset();
        self.project = None;
        self.documents = None;
        self.highlighted = None;
        self.notice = None;
        self.reopen_after_send = false;
    }

    fn open_conversation(&mut self) {
        let Some(project_id) = self.project_id().cloned() else {
            return;
        };
        match self.session.begin_open(project_id) {
            Ok(ticket) => {
                let backend = Arc::clone(&self.backend);
                self.spawn(async move {
                    let result = backend.open_conversation(ticket.project_id()).await;
                    ControllerEvent::Opened { ticket, result }
                });
            }
            Err(ConversationError::Busy) => {
                tracing::debug!("reopen deferred until the pending answer arrives");
                self.reopen_after_send = true;
            }
            Err(e) => self.notice = Some(e.guidance()),
        }
    }

    fn refresh_documents(&mut self) {
        let Some(project_id) = self.project_id().cloned() else {
            return;
        };
        let backend = Arc::clone(&self.backend);
        self.spawn(async move {
            let result = backend.list_documents(&project_id).await;
            ControllerEvent::DocumentsListed { project_id, result }
        });
    }

    /// Send `text` to the active conversation
    ///
    /// Refused with guidance, without contacting the backend, when no
    /// project is active, the project has no documents, or the conversation
    /// is not open.
    pub fn send_message(&mut self, text: &str) -> std::result::Result<(), ConversationError> {
        let result = self.try_send(text);
        if let Err(e) = &result {
            tracing::debug!(error = %e, "send refused");
            self.notice = Some(e.guidance());
        }
        result
    }

    fn try_send(&mut self, text: &str) -> std::result::Result<(), ConversationError> {
        if self.project.is_none() {
            return Err(ConversationError::NoProject);
        }
        if self.document_count() == Some(0) {
            return Err(ConversationError::NoDocuments);
        }

        let ticket = self.session.begin_send(text)?;
        self.notice = None;
        self.scroll.user_message_sent();

        let backend = Arc::clone(&self.backend);
        self.spawn(async move {
            let result = backend.send_message(ticket.conversation_id(), ticket.text()).await;
            ControllerEvent::Replied { ticket, result }
        });
        Ok(())
    }

    /// Apply the result of background work
    ///
    /// Results that belong to a previous project or conversation are
    /// discarded with [`ConversationError::Stale`].
    pub fn handle_event(&mut self, event: ControllerEvent) -> std::result::Result<(), ConversationError> {
        match event {
            ControllerEvent::Opened { ticket, result } => {
                let outcome = self.session.complete_open(ticket, result);
                match &outcome {
                    Ok(()) => {
                        self.notice = None;
                        self.scroll.content_changed();
                    }
                    Err(ConversationError::Stale) => {}
                    Err(e) => self.notice = Some(e.guidance()),
                }
                outcome
            }
            ControllerEvent::Replied { ticket, result } => {
                let outcome = self.session.complete_send(ticket, result);
                match &outcome {
                    Err(ConversationError::Stale) => return outcome,
                    Ok(()) => self.notice = None,
                    Err(e) => self.notice = Some(e.guidance()),
                }
                self.scroll.content_changed();
                if std::mem::take(&mut self.reopen_after_send) {
                    self.open_conversation();
                }
                outcome
            }
            ControllerEvent::DocumentsListed { project_id, result } => {
                if self.project_id() != Some(&project_id) {
                    return Err(ConversationError::Stale);
                }
                match result {
                    Ok(documents) => {
                        tracing::debug!(project = %project_id, count = documents.len(), "documents listed");
                        self.documents = Some(documents);
                    }
                    Err(e) => tracing::warn!(project = %project_id, error = %e, "could not list documents"),
                }
                Ok(())
            }
            ControllerEvent::Renamed { project_id, result } => {
                match result {
                    Ok(project) => {
                        tracing::info!(project = %project.id, name = %project.name, "project renamed");
                        if self.project_id() == Some(&project_id) {
                            self.project = Some(project.clone());
                        }
                        self.signals.publish(Signal::ProjectUpdated(project));
                    }
                    Err(e) => {
                        tracing::warn!(project = %project_id, error = %e, "rename failed");
                        if self.project_id() == Some(&project_id) {
                            self.notice = Some(format!("Rename failed: {}", e));
                        }
                    }
                }
                Ok(())
            }
        }
    }

    /// React to a notification from another panel
    pub fn handle_signal(&mut self, signal: Signal) {
        match signal {
            Signal::DocumentsChanged { project_id } => {
                if self.project_id() == Some(&project_id) {
                    tracing::info!(project = %project_id, "documents changed, reopening conversation");
                    self.refresh_documents();
                    self.open_conversation();
                }
            }
            Signal::ProjectUpdated(project) => {
                if self.project_id() == Some(&project.id) {
                    self.project = Some(project);
                }
            }
            Signal::CitationActivated { document_id } => self.highlighted = Some(document_id),
        }
    }

    /// Show or hide the full sources list of a message; returns whether it is now expanded
    pub fn toggle_citation_expansion(&mut self, key: MessageKey) -> bool {
        if self.log().position(&key).is_none() {
            return false;
        }
        let expanded = self.expansion.toggle(key);
        self.scroll.content_changed();
        expanded
    }

    pub fn jump_to_bottom(&mut self) {
        self.scroll.jump_to_bottom();
    }

    /// Rename the active project
    pub fn rename_project(&mut self, name: &str) -> std::result::Result<(), ConversationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ConversationError::InvalidState("project name is empty".to_string()));
        }
        let Some(project_id) = self.project_id().cloned() else {
            return Err(ConversationError::NoProject);
        };

        let backend = Arc::clone(&self.backend);
        let events = self.events.clone();
        let patch = ProjectPatch::rename(name);
        tokio::spawn(async move {
            let result = backend.update_project(&project_id, &patch).await;
            let _ = events.send(ControllerEvent::Renamed { project_id, result });
        });
        Ok(())
    }

    /// Announce that the user followed a citation to its document
    pub fn activate_citation(&mut self, document_id: DocumentId) {
        tracing::debug!(document = %document_id, "citation activated");
        self.highlighted = Some(document_id.clone());
        self.signals.publish(Signal::CitationActivated { document_id });
    }
}

impl Drop for ConversationController {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use askdocs_client::MockBackend;

    fn controller(backend: MockBackend) -> (ConversationController, mpsc::UnboundedReceiver<ControllerEvent>) {
        ConversationController::new(Arc::new(backend), &ChatConfig::default(), SignalHub::default())
    }

    fn project(id: &str) -> Project {
        Project { id: ProjectId::new(id), name: id.to_uppercase(), description: String::new() }
    }

    async fn pump(
        controller: &mut ConversationController, rx: &mut mpsc::UnboundedReceiver<ControllerEvent>, count: usize,
    ) {
        for _ in 0..count {
            let event = rx.recv().await.unwrap();
            let _ = controller.handle_event(event);
        }
    }

    #[test]
    fn test_status_without_project() {
        let (controller, _rx) = controller(MockBackend::new());
        assert_eq!(controller.status(), ConversationStatus::NoProject);
        assert_eq!(controller.notice().as_deref(), Some("Pick a project to start."));
        assert!(!controller.input_enabled());
    }

    #[tokio::test]
    async fn test_send_without_project_is_refused() {
        let (mut controller, _rx) = controller(MockBackend::new());
        assert_eq!(controller.send_message("hello"), Err(ConversationError::NoProject));
        assert!(controller.log().is_empty());
    }

    #[tokio::test]
    async fn test_activation_opens_and_lists() {
        let backend = MockBackend::new().with_project("p1", "Policies").with_document("p1", "d1", "a.pdf");
        let (mut controller, mut rx) = controller(backend);
        controller.activate_project(project("p1"));
        assert_eq!(controller.status(), ConversationStatus::Opening);

        pump(&mut controller, &mut rx, 2).await;
        assert_eq!(controller.status(), ConversationStatus::Ready);
        assert_eq!(controller.document_count(), Some(1));
        assert!(controller.input_enabled());
        assert_eq!(controller.notice(), None);
    }

    #[tokio::test]
    async fn test_open_failure_sets_notice() {
        let backend = MockBackend::new().with_project("p1", "Policies").with_document("p1", "d1", "a.pdf");
        backend.fail_next_opens(1);
        let (mut controller, mut rx) = controller(backend);
        controller.activate_project(project("p1"));
        pump(&mut controller, &mut rx, 2).await;

        assert_eq!(controller.status(), ConversationStatus::Unavailable);
        assert!(!controller.input_enabled());
        assert!(controller.notice().unwrap().contains("unavailable"));
    }

    #[tokio::test]
    async fn test_toggle_expansion_requires_known_key() {
        let backend = MockBackend::new().with_project("p1", "Policies").with_document("p1", "d1", "a.pdf");
        backend.push_answer("see a", vec![askdocs_core::Citation::new("d1")]);
        let (mut controller, mut rx) = controller(backend);
        controller.activate_project(project("p1"));
        pump(&mut controller, &mut rx, 2).await;

        assert!(!controller.toggle_citation_expansion(MessageKey::Index(5)));
        controller.send_message("q").unwrap();
        pump(&mut controller, &mut rx, 1).await;

        let key = controller.log().key_of(1).unwrap();
        assert!(controller.toggle_citation_expansion(key.clone()));
        assert!(controller.expansion().is_expanded(&key));
        assert!(!controller.toggle_citation_expansion(key));
    }

    #[tokio::test]
    async fn test_activate_citation_publishes() {
        let hub = SignalHub::default();
        let mut signals = hub.subscribe();
        let (mut controller, _rx) =
            ConversationController::new(Arc::new(MockBackend::new()), &ChatConfig::default(), hub);

        controller.activate_citation(DocumentId::new("d1"));
        assert_eq!(controller.highlighted_document(), Some(&DocumentId::new("d1")));
        assert_eq!(
            signals.recv().await.unwrap(),
            Signal::CitationActivated { document_id: DocumentId::new("d1") }
        );
    }

    #[tokio::test]
    async fn test_rename_rejects_blank_name() {
        let backend = MockBackend::new().with_project("p1", "Policies");
        let (mut controller, _rx) = controller(backend);
        controller.activate_project(project("p1"));
        assert!(matches!(controller.rename_project("   "), Err(ConversationError::InvalidState(_))));
    }
}
