use askdocs_core::{
    ConversationId, ConversationSnapshot, Document, DocumentId, Project, ProjectId, ProjectPatch, Reply, Result,
};
use serde::Deserialize;
use std::path::Path;

/// Projects known to the backend
#[async_trait::async_trait]
pub trait ProjectDirectory: Send + Sync {
    async fn list_projects(&self) -> Result<Vec<Project>>;

    async fn create_project(&self, name: &str, description: &str) -> Result<Project>;

    async fn delete_project(&self, id: &ProjectId) -> Result<()>;

    /// Apply a partial update and return the project as stored
    async fn update_project(&self, id: &ProjectId, patch: &ProjectPatch) -> Result<Project>;
}

/// Documents attached to projects
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    async fn list_documents(&self, project_id: &ProjectId) -> Result<Vec<Document>>;

    /// Upload a local file; ingestion happens asynchronously on the server
    async fn upload_document(&self, path: &Path, project_id: &ProjectId) -> Result<UploadReceipt>;

    async fn delete_document(&self, id: &DocumentId) -> Result<()>;
}

/// Conversation endpoints of the backend
#[async_trait::async_trait]
pub trait MessageExchange: Send + Sync {
    /// Create or reuse the conversation of a project, with its history when one exists
    async fn open_conversation(&self, project_id: &ProjectId) -> Result<ConversationSnapshot>;

    /// Ask a question and wait for the cited answer
    async fn send_message(&self, conversation_id: &ConversationId, text: &str) -> Result<Reply>;
}

/// Everything the conversation view talks to
pub trait Backend: ProjectDirectory + DocumentStore + MessageExchange {}

impl<T> Backend for T where T: ProjectDirectory + DocumentStore + MessageExchange {}

/// Acknowledgement of an accepted upload
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadReceipt {
    pub id: DocumentId,
    #[serde(default)]
    pub status: String,
}
