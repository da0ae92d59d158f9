use askdocs_core::{DeliveryState, Message, MessageId, Role};

use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;

/// Stable identity of a message within one conversation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MessageKey {
    Server(MessageId),
    Created(DateTime<Utc>),
    Index(usize),
}

/// Ordered conversation turns
///
/// Locally created messages are stamped with strictly increasing creation
/// times so their keys never collide, and a replaced placeholder hands its
/// stamp to the message that replaces it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageLog {
    messages: Vec<Message>,
    last_stamp: Option<DateTime<Utc>>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_stamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let stamp = match self.last_stamp {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_stamp = Some(stamp);
        stamp
    }

    fn observe(&mut self, message: &Message) {
        if let Some(created) = message.created_at
            && self.last_stamp.is_none_or(|last| created > last)
        {
            self.last_stamp = Some(created);
        }
    }

    /// Append a message, stamping it when it has neither id nor timestamp
    pub fn append(&mut self, mut message: Message) -> MessageKey {
        if message.id.is_none() && message.created_at.is_none() {
            message.created_at = Some(self.next_stamp());
        } else {
            self.observe(&message);
        }
        self.messages.push(message);
        self.key_of(self.messages.len() - 1)
            .unwrap_or(MessageKey::Index(self.messages.len() - 1))
    }

    /// Replace the last message matching `predicate`
    pub fn replace_tail<P>(&mut self, predicate: P, mut message: Message) -> bool
    where
        P: Fn(&Message) -> bool,
    {
        let Some(index) = self.messages.iter().rposition(predicate) else {
            return false;
        };
        if message.id.is_none() && message.created_at.is_none() {
            message.created_at = self.messages[index].created_at;
        }
        self.observe(&message);
        self.messages[index] = message;
        true
    }

    /// Set the delivery state of the last message matching `predicate`
    pub fn mark_tail<P>(&mut self, predicate: P, state: DeliveryState) -> bool
    where
        P: Fn(&Message) -> bool,
    {
        match self.messages.iter_mut().rev().find(|m| predicate(m)) {
            Some(message) => {
                message.state = state;
                true
            }
            None => false,
        }
    }

    /// Replace the whole log, keeping the given order
    pub fn replace_all(&mut self, messages: Vec<Message>) {
        self.messages.clear();
        for message in &messages {
            self.observe(message);
        }
        self.messages = messages;
    }

    pub fn all(&self) -> &[Message] {
        &self.messages
    }

    pub fn get(&self, index: usize) -> Option<&Message> {
        self.messages.get(index)
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Whether an assistant placeholder is waiting for its reply
    pub fn has_pending(&self) -> bool {
        self.messages.last().is_some_and(Message::is_pending_placeholder)
    }

    pub fn key_of(&self, index: usize) -> Option<MessageKey> {
        let message = self.messages.get(index)?;
        Some(match (&message.id, message.created_at) {
            (Some(id), _) => MessageKey::Server(id.clone()),
            (None, Some(created)) => MessageKey::Created(created),
            (None, None) => MessageKey::Index(index),
        })
    }

    pub fn position(&self, key: &MessageKey) -> Option<usize> {
        (0..self.messages.len()).find(|&i| self.key_of(i).as_ref() == Some(key))
    }

    /// Indices of assistant messages that carry citations
    pub fn cited_indices(&self) -> Vec<usize> {
        self.messages
            .iter()
            .enumerate()
            .filter(|(_, m)| m.role == Role::Assistant && m.has_citations())
            .map(|(i, _)| i)
            .collect()
    }
}

/// Messages whose sources list is shown in full
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionState {
    expanded: HashSet<MessageKey>,
}

impl ExpansionState {
    /// Flip a message between collapsed and expanded; returns the new state
    pub fn toggle(&mut self, key: MessageKey) -> bool {
        if self.expanded.remove(&key) {
            false
        } else {
            self.expanded.insert(key);
            true
        }
    }

    pub fn is_expanded(&self, key: &MessageKey) -> bool {
        self.expanded.contains(key)
    }

    pub fn len(&self) -> usize {
        self.expanded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expanded.is_empty()
    }

    pub fn clear(&mut self) {
        self.expanded.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use askdocs_core::Citation;

    #[test]
    fn test_append_stamps_increasing_times() {
        let mut log = MessageLog::new();
        let a = log.append(Message::user("one"));
        let b = log.append(Message::user("two"));
        let c = log.append(Message::user("three"));

        let times: Vec<_> = log.all().iter().map(|m| m.created_at.unwrap()).collect();
        assert!(times[0] < times[1] && times[1] < times[2]);
        assert_ne!(a, b);
        assert_ne!(b, c);
    }

    #[test]
    fn test_server_id_wins_for_key() {
        let mut log = MessageLog::new();
        let key = log.append(Message::assistant("hi").with_id("m7"));
        assert_eq!(key, MessageKey::Server(MessageId::new("m7")));
        assert_eq!(log.position(&key), Some(0));
    }

    #[test]
    fn test_history_without_ids_uses_index() {
        let mut log = MessageLog::new();
        log.replace_all(vec![Message::user("a"), Message::assistant("b")]);
        assert_eq!(log.key_of(1), Some(MessageKey::Index(1)));
        assert_eq!(log.key_of(2), None);
    }

    #[test]
    fn test_replace_tail_keeps_key() {
        let mut log = MessageLog::new();
        log.append(Message::user("q"));
        let placeholder = log.append(Message::assistant("").with_state(DeliveryState::Pending));
        assert!(log.has_pending());

        let replaced = log.replace_tail(
            Message::is_pending_placeholder,
            Message::assistant("answer").with_citations(vec![Citation::new("d1")]),
        );
        assert!(replaced);
        assert!(!log.has_pending());
        assert_eq!(log.key_of(1), Some(placeholder));
        assert_eq!(log.len(), 2);
        assert_eq!(log.all()[1].text, "answer");
    }

    #[test]
    fn test_replace_tail_without_match() {
        let mut log = MessageLog::new();
        log.append(Message::user("q"));
        assert!(!log.replace_tail(Message::is_pending_placeholder, Message::assistant("x")));
        assert_eq!(log.len(), 1);
        assert_eq!(log.all()[0].text, "q");
    }

    #[test]
    fn test_replace_tail_picks_last_match() {
        let mut log = MessageLog::new();
        log.append(Message::user("first"));
        log.append(Message::user("second"));
        log.replace_tail(|m| m.role == Role::User, Message::user("edited"));
        let texts: Vec<&str> = log.all().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "edited"]);
    }

    #[test]
    fn test_stamps_stay_after_history() {
        let mut log = MessageLog::new();
        let future = Utc::now() + Duration::hours(1);
        log.replace_all(vec![Message::user("old").with_created_at(future)]);
        log.append(Message::user("new"));
        assert!(log.all()[1].created_at.unwrap() > future);
    }

    #[test]
    fn test_mark_tail() {
        let mut log = MessageLog::new();
        log.append(Message::user("q").with_state(DeliveryState::Optimistic));
        assert!(log.mark_tail(|m| m.role == Role::User, DeliveryState::Confirmed));
        assert_eq!(log.all()[0].state, DeliveryState::Confirmed);
        assert!(!log.mark_tail(|m| m.role == Role::System, DeliveryState::Confirmed));
    }

    #[test]
    fn test_cited_indices() {
        let mut log = MessageLog::new();
        log.append(Message::user("q"));
        log.append(Message::assistant("a").with_citations(vec![Citation::new("d1")]));
        log.append(Message::assistant("b"));
        assert_eq!(log.cited_indices(), vec![1]);
    }

    #[test]
    fn test_expansion_toggle() {
        let mut expansion = ExpansionState::default();
        let key = MessageKey::Index(3);
        assert!(expansion.toggle(key.clone()));
        assert!(expansion.is_expanded(&key));
        assert!(!expansion.toggle(key.clone()));
        assert!(expansion.is_empty());

        expansion.toggle(key);
        expansion.clear();
        assert_eq!(expansion.len(), 0);
    }
}
