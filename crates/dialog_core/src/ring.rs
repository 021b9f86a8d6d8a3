//! Bounded message history
//!
//! A fixed-capacity ring: pushing beyond capacity silently drops the
//! oldest entry. Bounds both session storage and the context handed to
//! the reply model.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_HISTORY_CAPACITY: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Assistant,
    System,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: Sender,
    pub text: String,
    pub at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            sender,
            text: text.into(),
            at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRing {
    capacity: usize,
    messages: VecDeque<ChatMessage>,
}

impl Default for MessageRing {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl MessageRing {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            messages: VecDeque::new(),
        }
    }

    /// Append a message, dropping the oldest when full.
    pub fn push(&mut self, message: ChatMessage) {
        if self.messages.len() == self.capacity {
            self.messages.pop_front();
        }
        self.messages.push_back(message);
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter()
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.back()
    }

    /// The newest `n` messages, oldest first.
    pub fn recent(&self, n: usize) -> Vec<ChatMessage> {
        let skip = self.messages.len().saturating_sub(n);
        self.messages.iter().skip(skip).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_within_capacity() {
        let mut ring = MessageRing::new(3);
        ring.push(ChatMessage::new(Sender::User, "hi"));
        ring.push(ChatMessage::new(Sender::Assistant, "hello"));
        assert_eq!(ring.len(), 2);
        assert_eq!(ring.last().unwrap().text, "hello");
    }

    #[test]
    fn test_overflow_drops_oldest() {
        let mut ring = MessageRing::new(2);
        ring.push(ChatMessage::new(Sender::User, "one"));
        ring.push(ChatMessage::new(Sender::User, "two"));
        ring.push(ChatMessage::new(Sender::User, "three"));

        assert_eq!(ring.len(), 2);
        let texts: Vec<_> = ring.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["two", "three"]);
    }

    #[test]
    fn test_recent_returns_newest_first_ordered_oldest_first() {
        let mut ring = MessageRing::new(5);
        for text in ["a", "b", "c", "d"] {
            ring.push(ChatMessage::new(Sender::User, text));
        }
        let recent: Vec<_> = ring.recent(2).into_iter().map(|m| m.text).collect();
        assert_eq!(recent, vec!["c", "d"]);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let ring = MessageRing::new(0);
        assert_eq!(ring.capacity(), 1);
    }
}
