use thiserror::Error;

/// Result type alias for askdocs-core
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types shared across the AskDocs client
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error for file operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Transport failure talking to the backend (connect, TLS, body read)
    #[error("http error: {0}")]
    Http(String),

    /// Backend answered with a non-success status
    #[error("backend returned {status}: {detail}")]
    Backend { status: u16, detail: String },

    /// Parse/serialization errors
    #[error("parse error: {0}")]
    Parse(String),

    /// Conversation protocol errors
    #[error(transparent)]
    Conversation(#[from] ConversationError),

    /// Validation errors
    #[error("validation error: {0}")]
    Validation(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Parse(err.to_string())
    }
}

impl Error {
    /// Create a backend status error
    pub fn backend(status: u16, detail: impl Into<String>) -> Self {
        Self::Backend { status, detail: detail.into() }
    }

    /// Whether the backend rejected the request because the project has no documents yet
    pub fn is_missing_documents(&self) -> bool {
        match self {
            Error::Backend { detail, .. } => {
                let detail = detail.to_lowercase();
                detail.contains("no documents") || detail.contains("documents missing")
            }
            _ => false,
        }
    }
}

/// Errors raised by the conversation session and its controller
///
/// Every variant is local to the operation that produced it; none of them
/// reset scroll position, other messages, or other projects.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConversationError {
    /// The backend could not provide or create a conversation
    #[error("could not open conversation: {0}")]
    OpenFailed(String),

    /// The exchange call failed after the user message was appended
    #[error("message could not be delivered: {0}")]
    SendFailed(String),

    /// A send is already in flight
    #[error("a message is already being answered")]
    Busy,

    /// Operation is not valid in the current state
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// A response arrived for a conversation that is no longer current
    #[error("response belongs to a conversation that is no longer active")]
    Stale,

    /// No project is active
    #[error("no project selected")]
    NoProject,

    /// The active project has no documents
    #[error("project has no documents")]
    NoDocuments,
}

impl ConversationError {
    /// Guidance shown to the user in place of contacting the backend
    pub fn guidance(&self) -> String {
        match self {
            ConversationError::NoProject => "Pick a project to start.".to_string(),
            ConversationError::NoDocuments => {
                "No documents uploaded yet. Upload documents to this project to start chatting.".to_string()
            }
            ConversationError::OpenFailed(_) => "Conversation unavailable. Chat input is disabled.".to_string(),
            ConversationError::Busy => "Still waiting for the previous answer.".to_string(),
            ConversationError::InvalidState(reason) => reason.clone(),
            ConversationError::SendFailed(_) => "Send failed. You can send the message again.".to_string(),
            ConversationError::Stale => String::new(),
        }
    }

    /// Whether the failure was rejected before touching the transcript
    pub fn is_synchronous_rejection(&self) -> bool {
        matches!(
            self,
            ConversationError::Busy
                | ConversationError::InvalidState(_)
                | ConversationError::NoProject
                | ConversationError::NoDocuments
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_display() {
        let err = Error::backend(400, "text required");
        assert_eq!(err.to_string(), "backend returned 400: text required");
    }

    #[test]
    fn test_conversation_error_converts() {
        let err: Error = ConversationError::Busy.into();
        assert!(matches!(err, Error::Conversation(ConversationError::Busy)));
        assert_eq!(err.to_string(), "a message is already being answered");
    }

    #[test]
    fn test_missing_documents_detection() {
        assert!(Error::backend(400, "No documents in project").is_missing_documents());
        assert!(!Error::backend(500, "internal error").is_missing_documents());
        assert!(!Error::Http("connection refused".to_string()).is_missing_documents());
    }

    #[test]
    fn test_synchronous_rejections() {
        assert!(ConversationError::Busy.is_synchronous_rejection());
        assert!(ConversationError::InvalidState("empty".to_string()).is_synchronous_rejection());
        assert!(!ConversationError::SendFailed("timeout".to_string()).is_synchronous_rejection());
        assert!(!ConversationError::Stale.is_synchronous_rejection());
    }

    #[test]
    fn test_json_error_converts_to_parse() {
        let err: Error = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert!(matches!(err, Error::Parse(_)));
    }
}
