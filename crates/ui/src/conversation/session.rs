use super::log::MessageLog;

use askdocs_client::MessageExchange;
use askdocs_core::{
    ConversationError, ConversationId, ConversationSnapshot, DeliveryState, Message, ProjectId, Reply, Result, Role,
};

/// Text of the message that stands in for a reply that never came
pub const SEND_FAILED_TEXT: &str = "Send failed";

/// Proof that an open was started; hand it back with the result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenTicket {
    generation: u64,
    project_id: ProjectId,
}

impl OpenTicket {
    pub fn project_id(&self) -> &ProjectId {
        &self.project_id
    }
}

/// Proof that a send was started; hand it back with the reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendTicket {
    generation: u64,
    conversation_id: ConversationId,
    text: String,
}

impl SendTicket {
    pub fn conversation_id(&self) -> &ConversationId {
        &self.conversation_id
    }

    /// Trimmed text that was appended and must be sent
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Binds a project to its backend conversation and owns the message log
///
/// Every remote call is split into a `begin_*` step that validates and
/// updates local state, and a `complete_*` step that applies the result.
/// Results carry the ticket issued by the matching `begin_*` call, and a
/// ticket from before the last reset or open is rejected as
/// [`ConversationError::Stale`].
#[derive(Debug, Default)]
pub struct ConversationSession {
    project_id: Option<ProjectId>,
    conversation_id: Option<ConversationId>,
    log: MessageLog,
    generation: u64,
    opening: bool,
    sending: bool,
}

impl ConversationSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> &MessageLog {
        &self.log
    }

    pub fn project_id(&self) -> Option<&ProjectId> {
        self.project_id.as_ref()
    }

    pub fn conversation_id(&self) -> Option<&ConversationId> {
        self.conversation_id.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.conversation_id.is_some()
    }

    pub fn is_opening(&self) -> bool {
        self.opening
    }

    pub fn is_sending(&self) -> bool {
        self.sending
    }

    /// Forget the conversation, its messages and anything in flight
    pub fn reset(&mut self) {
        self.generation += 1;
        self.project_id = None;
        self.conversation_id = None;
        self.log.clear();
        self.opening = false;
        self.sending = false;
    }

    /// Start opening the conversation of `project_id`
    ///
    /// Switching to another project resets the session first. Re-opening the
    /// same project is refused while a send is outstanding.
    pub fn begin_open(&mut self, project_id: ProjectId) -> std::result::Result<OpenTicket, ConversationError> {
        if self.project_id.as_ref() != Some(&project_id) {
            self.reset();
        } else if self.sending {
            return Err(ConversationError::Busy);
        }

        self.generation += 1;
        self.project_id = Some(project_id.clone());
        self.opening = true;
        tracing::debug!(project = %project_id, generation = self.generation, "opening conversation");
        Ok(OpenTicket { generation: self.generation, project_id })
    }

    /// Apply the outcome of an open
    pub fn complete_open(
        &mut self, ticket: OpenTicket, result: Result<ConversationSnapshot>,
    ) -> std::result::Result<(), ConversationError> {
        if ticket.generation != self.generation || self.project_id.as_ref() != Some(&ticket.project_id) {
            tracing::debug!(project = %ticket.project_id, "discarding stale open");
            return Err(ConversationError::Stale);
        }
        self.opening = false;

        match result {
            Ok(snapshot) => {
                tracing::info!(
                    project = %ticket.project_id,
                    conversation = %snapshot.id,
                    messages = snapshot.messages.len(),
                    "conversation opened"
                );
                self.log.replace_all(snapshot.messages);
                self.conversation_id = Some(snapshot.id);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(project = %ticket.project_id, error = %e, "conversation unavailable");
                self.conversation_id = None;
                Err(ConversationError::OpenFailed(e.to_string()))
            }
        }
    }

    /// Append the user message and the assistant placeholder
    pub fn begin_send(&mut self, text: &str) -> std::result::Result<SendTicket, ConversationError> {
        let Some(conversation_id) = self.conversation_id.clone() else {
            return Err(ConversationError::InvalidState("no open conversation".to_string()));
        };
        if self.sending {
            return Err(ConversationError::Busy);
        }
        if self.opening {
            return Err(ConversationError::InvalidState("conversation is still opening".to_string()));
        }
        let text = text.trim();
        if text.is_empty() {
            return Err(ConversationError::InvalidState("message is empty".to_string()));
        }

        self.log.append(Message::user(text).with_state(DeliveryState::Optimistic));
        self.log.append(Message::assistant("").with_state(DeliveryState::Pending));
        self.sending = true;
        tracing::debug!(conversation = %conversation_id, chars = text.chars().count(), "message sent");

        Ok(SendTicket { generation: self.generation, conversation_id, text: text.to_string() })
    }

    /// Resolve the placeholder with the reply, or with the failure message
    ///
    /// The user message stays in the log either way.
    pub fn complete_send(
        &mut self, ticket: SendTicket, result: Result<Reply>,
    ) -> std::result::Result<(), ConversationError> {
        if ticket.generation != self.generation || self.conversation_id.as_ref() != Some(&ticket.conversation_id) {
            tracing::debug!(conversation = %ticket.conversation_id, "discarding stale reply");
            return Err(ConversationError::Stale);
        }
        self.sending = false;

        match result {
            Ok(reply) => {
                let answer = Message::assistant(reply.answer)
                    .with_citations(reply.citations)
                    .with_state(DeliveryState::Confirmed);
                self.log.replace_tail(Message::is_pending_placeholder, answer);
                self.log.mark_tail(
                    |m| m.role == Role::User && m.state == DeliveryState::Optimistic,
                    DeliveryState::Confirmed,
                );
                Ok(())
            }
            Err(e) => {
                tracing::warn!(conversation = %ticket.conversation_id, error = %e, "send failed");
                let failure = Message::assistant(SEND_FAILED_TEXT).with_state(DeliveryState::Failed);
                self.log.replace_tail(Message::is_pending_placeholder, failure);
                Err(ConversationError::SendFailed(e.to_string()))
            }
        }
    }

    /// Open the conversation and wait for the result
    pub async fn open(
        &mut self, exchange: &dyn MessageExchange, project_id: ProjectId,
    ) -> std::result::Result<(), ConversationError> {
        let ticket = self.begin_open(project_id)?;
        let result = exchange.open_conversation(ticket.project_id()).await;
        self.complete_open(ticket, result)
    }

    /// Send a message and wait for the reply
    pub async fn send(
        &mut self, exchange: &dyn MessageExchange, text: &str,
    ) -> std::result::Result<(), ConversationError> {
        let ticket = self.begin_send(text)?;
        let result = exchange.send_message(ticket.conversation_id(), ticket.text()).await;
        self.complete_send(ticket, result)
    }
}
