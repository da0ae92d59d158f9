use crate::api::{DocumentStore, MessageExchange, ProjectDirectory, UploadReceipt};

use askdocs_core::{
    Citation, ConversationId, ConversationSnapshot, Document, DocumentId, Error, Message, Project, ProjectId,
    ProjectPatch, Reply, Result,
};
use serde::Deserialize;
use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::Semaphore;

/// Scripted reply to the next `send_message`
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MockReply {
    Answer {
        answer: String,
        #[serde(default)]
        citations: Vec<Citation>,
    },
    Error {
        #[serde(default = "default_error_status")]
        status: u16,
        detail: String,
    },
}

fn default_error_status() -> u16 {
    500
}

#[derive(Debug, Deserialize)]
struct MockDocument {
    project: ProjectId,
    #[serde(flatten)]
    document: Document,
}

/// Mock fixture file
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct MockFixture {
    #[serde(default)]
    projects: Vec<Project>,
    #[serde(default)]
    documents: Vec<MockDocument>,
    #[serde(default)]
    replies: Vec<MockReply>,
}

#[derive(Debug, Default)]
struct MockState {
    projects: Vec<Project>,
    documents: HashMap<ProjectId, Vec<Document>>,
    conversations: HashMap<ProjectId, (ConversationId, Vec<Message>)>,
    replies: VecDeque<MockReply>,
    sent: Vec<(ConversationId, String)>,
    open_failures: usize,
    next_id: u64,
}

impl MockState {
    /// Fresh id that does not clash with fixture-provided ones
    fn next_id(&mut self, prefix: &str) -> String {
        loop {
            self.next_id += 1;
            let id = format!("{}{}", prefix, self.next_id);
            if !self.id_taken(&id) {
                return id;
            }
        }
    }

    fn id_taken(&self, id: &str) -> bool {
        self.projects.iter().any(|p| p.id.as_str() == id)
            || self.documents.values().flatten().any(|d| d.id.as_str() == id)
            || self.conversations.values().any(|(c, _)| c.as_str() == id)
    }

    fn project_of(&self, conversation_id: &ConversationId) -> Option<ProjectId> {
        self.conversations
            .iter()
            .find(|(_, (id, _))| id == conversation_id)
            .map(|(project, _)| project.clone())
    }
}

/// In-memory backend for deterministic tests and offline runs
///
/// Replies are served in order from a queue; when the queue is empty the
/// backend answers with a fixed text. A [`ReplyGate`] can hold replies until
/// a test releases them, which makes "response arrives later" scenarios
/// reproducible.
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    state: Arc<Mutex<MockState>>,
    gate: Option<Arc<Semaphore>>,
}

/// Releases replies held by a gated [`MockBackend`]
#[derive(Debug, Clone)]
pub struct ReplyGate {
    permits: Arc<Semaphore>,
}

impl ReplyGate {
    /// Let the next `count` held replies through
    pub fn release(&self, count: usize) {
        self.permits.add_permits(count);
    }
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load projects, documents and replies from a TOML fixture
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let fixture: MockFixture =
            toml::from_str(content).map_err(|e| Error::Parse(format!("invalid mock fixture: {}", e)))?;
        let backend = Self::new();
        {
            let mut state = backend.lock();
            state.projects = fixture.projects;
            for MockDocument { project, document } in fixture.documents {
                state.documents.entry(project).or_default().push(document);
            }
            state.replies = fixture.replies.into();
        }
        Ok(backend)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Hold every reply until released through the returned gate
    pub fn gated(mut self) -> (Self, ReplyGate) {
        let permits = Arc::new(Semaphore::new(0));
        self.gate = Some(Arc::clone(&permits));
        (self, ReplyGate { permits })
    }

    pub fn with_project(self, id: &str, name: &str) -> Self {
        self.lock()
            .projects
            .push(Project { id: ProjectId::new(id), name: name.to_string(), description: String::new() });
        self
    }

    pub fn with_document(self, project: &str, id: &str, filename: &str) -> Self {
        self.lock().documents.entry(ProjectId::new(project)).or_default().push(Document {
            id: DocumentId::new(id),
            filename: filename.to_string(),
            status: "ready".to_string(),
            size: None,
        });
        self
    }

    /// Seed an existing conversation so that opening the project returns history
    pub fn with_conversation(self, project: &str, id: &str, messages: Vec<Message>) -> Self {
        self.lock()
            .conversations
            .insert(ProjectId::new(project), (ConversationId::new(id), messages));
        self
    }

    pub fn push_reply(&self, reply: MockReply) {
        self.lock().replies.push_back(reply);
    }

    pub fn push_answer(&self, answer: &str, citations: Vec<Citation>) {
        self.push_reply(MockReply::Answer { answer: answer.to_string(), citations });
    }

    /// Make the next `count` conversation opens fail
    pub fn fail_next_opens(&self, count: usize) {
        self.lock().open_failures = count;
    }

    /// Messages received so far, in order
    pub fn sent_messages(&self) -> Vec<(ConversationId, String)> {
        self.lock().sent.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait::async_trait]
impl ProjectDirectory for MockBackend {
    async fn list_projects(&self) -> Result<Vec<Project>> {
        Ok(self.lock().projects.clone())
    }

    async fn create_project(&self, name: &str, description: &str) -> Result<Project> {
        if name.trim().is_empty() {
            return Err(Error::backend(400, "name: This field may not be blank."));
        }
        let mut state = self.lock();
        let project =
            Project { id: ProjectId::new(state.next_id("p")), name: name.to_string(), description: description.to_string() };
        state.projects.insert(0, project.clone());
        Ok(project)
    }

    async fn delete_project(&self, id: &ProjectId) -> Result<()> {
        let mut state = self.lock();
        let before = state.projects.len();
        state.projects.retain(|p| &p.id != id);
        if state.projects.len() == before {
            return Err(Error::backend(404, "Not found."));
        }
        Ok(())
    }

    async fn update_project(&self, id: &ProjectId, patch: &ProjectPatch) -> Result<Project> {
        let mut state = self.lock();
        let project = state
            .projects
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| Error::backend(404, "Not found."))?;
        if let Some(name) = &patch.name {
            project.name = name.clone();
        }
        if let Some(description) = &patch.description {
            project.description = description.clone();
        }
        Ok(project.clone())
    }
}

#[async_trait::async_trait]
impl DocumentStore for MockBackend {
    async fn list_documents(&self, project_id: &ProjectId) -> Result<Vec<Document>> {
        Ok(self.lock().documents.get(project_id).cloned().unwrap_or_default())
    }

    async fn upload_document(&self, path: &Path, project_id: &ProjectId) -> Result<UploadReceipt> {
        let size = tokio::fs::metadata(path).await?.len();
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| Error::Validation(format!("not a file: {}", path.display())))?;

        let mut state = self.lock();
        let id = DocumentId::new(state.next_id("d"));
        state.documents.entry(project_id.clone()).or_default().push(Document {
            id: id.clone(),
            filename,
            status: "queued".to_string(),
            size: Some(size),
        });
        Ok(UploadReceipt { id, status: "queued".to_string() })
    }

    async fn delete_document(&self, id: &DocumentId) -> Result<()> {
        let mut state = self.lock();
        let mut removed = false;
        for documents in state.documents.values_mut() {
            let before = documents.len();
            documents.retain(|d| &d.id != id);
            removed |= documents.len() != before;
        }
        if removed { Ok(()) } else { Err(Error::backend(404, "Not found.")) }
    }
}

#[async_trait::async_trait]
impl MessageExchange for MockBackend {
    async fn open_conversation(&self, project_id: &ProjectId) -> Result<ConversationSnapshot> {
        let mut state = self.lock();
        if state.open_failures > 0 {
            state.open_failures -= 1;
            return Err(Error::backend(500, "internal error"));
        }
        if !state.projects.iter().any(|p| &p.id == project_id) {
            return Err(Error::backend(404, "Not found."));
        }

        if let Some((id, messages)) = state.conversations.get(project_id) {
            return Ok(ConversationSnapshot { id: id.clone(), messages: messages.clone() });
        }

        let id = ConversationId::new(state.next_id("c"));
        state.conversations.insert(project_id.clone(), (id.clone(), Vec::new()));
        Ok(ConversationSnapshot { id, messages: Vec::new() })
    }

    async fn send_message(&self, conversation_id: &ConversationId, text: &str) -> Result<Reply> {
        let reply = {
            let mut state = self.lock();
            if state.project_of(conversation_id).is_none() {
                return Err(Error::backend(404, "Not found."));
            }
            state.sent.push((conversation_id.clone(), text.to_string()));
            state.replies.pop_front()
        };

        if let Some(gate) = &self.gate {
            let permit = gate
                .acquire()
                .await
                .map_err(|_| Error::Http("mock gate closed".to_string()))?;
            permit.forget();
        }

        let reply = match reply {
            Some(MockReply::Answer { answer, citations }) => Reply { answer, citations },
            Some(MockReply::Error { status, detail }) => return Err(Error::backend(status, detail)),
            None => Reply { answer: "No more mock replies configured".to_string(), citations: Vec::new() },
        };

        let mut state = self.lock();
        if let Some(project) = state.project_of(conversation_id)
            && let Some((_, history)) = state.conversations.get_mut(&project)
        {
            history.push(Message::user(text));
            history.push(Message::assistant(reply.answer.clone()).with_citations(reply.citations.clone()));
        }
        Ok(reply)
    }
}
