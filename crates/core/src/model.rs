//! Decoded backend payloads shared by every crate in the workspace.

use crate::ids::{ConversationId, DocumentId, MessageId, ProjectId};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A project groups documents and owns one active conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Partial update sent to the project directory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ProjectPatch {
    pub fn rename(name: impl Into<String>) -> Self {
        Self { name: Some(name.into()), description: None }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }
}

/// An uploaded document as listed by the document store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub filename: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub size: Option<u64>,
}

/// Reference from an assistant answer to a source passage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    pub document_id: Option<DocumentId>,
    pub document_title: Option<String>,
    pub page: Option<u32>,
    pub snippet: Option<String>,
    /// 1-based position assigned by the backend
    pub index: Option<u32>,
    pub chunk_id: Option<String>,
    pub score: Option<f64>,
}

impl Citation {
    pub fn new(document_id: impl Into<DocumentId>) -> Self {
        Self { document_id: Some(document_id.into()), ..Self::default() }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.document_title = Some(title.into());
        self
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = Some(snippet.into());
        self
    }

    /// Title when present and non-blank
    pub fn title(&self) -> Option<&str> {
        self.document_title.as_deref().filter(|t| !t.trim().is_empty())
    }
}

/// Speaker of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

/// Delivery state of a message in the local log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeliveryState {
    /// Came from the server or was confirmed by a completed exchange
    #[default]
    Confirmed,
    /// Sent, reply not yet received
    Pending,
    /// Synthesized locally, not yet confirmed
    Optimistic,
    /// Local failure indicator standing in for a reply that never came
    Failed,
}

/// One conversation turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub id: Option<MessageId>,
    pub role: Role,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub citations: Vec<Citation>,
    #[serde(skip)]
    pub state: DeliveryState,
}

impl Message {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            id: None,
            role,
            text: text.into(),
            created_at: None,
            citations: Vec::new(),
            state: DeliveryState::Confirmed,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, text)
    }

    pub fn with_id(mut self, id: impl Into<MessageId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_citations(mut self, citations: Vec<Citation>) -> Self {
        self.citations = citations;
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn with_state(mut self, state: DeliveryState) -> Self {
        self.state = state;
        self
    }

    pub fn is_pending(&self) -> bool {
        self.state == DeliveryState::Pending
    }

    pub fn is_pending_placeholder(&self) -> bool {
        self.role == Role::Assistant && self.is_pending()
    }

    pub fn has_citations(&self) -> bool {
        !self.citations.is_empty()
    }
}

/// Conversation handed back when a project's conversation is opened
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConversationSnapshot {
    pub id: ConversationId,
    #[serde(default)]
    pub messages: Vec<Message>,
}

/// Answer returned by the message exchange
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Reply {
    pub answer: String,
    #[serde(default)]
    pub citations: Vec<Citation>,
}
