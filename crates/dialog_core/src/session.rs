//! Dialogue session
//!
//! One record per identity key. Created lazily on first contact, mutated
//! in place every turn, deleted by TTL expiry. The identity key is derived
//! once and never changes for the life of the session.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::flow::{FlowData, FlowKind, FlowStep};
use crate::ring::{ChatMessage, MessageRing, Sender};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogSession {
    pub identity_key: String,

    pub authenticated: bool,

    /// Overall task in progress, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow: Option<FlowKind>,

    /// Current question within the flow.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<FlowStep>,

    #[serde(default)]
    pub data: FlowData,

    /// Question keys already asked in the current flow. Guards against
    /// repeating a question verbatim.
    #[serde(default)]
    pub asked_questions: HashSet<String>,

    #[serde(default)]
    pub history: MessageRing,

    pub started_at: DateTime<Utc>,

    pub last_active_at: DateTime<Utc>,

    /// Sliding expiry, reset on every committed turn.
    pub expires_at: DateTime<Utc>,
}

impl DialogSession {
    pub fn new(identity_key: impl Into<String>, authenticated: bool, window: Duration) -> Self {
        let now = Utc::now();
        Self {
            identity_key: identity_key.into(),
            authenticated,
            flow: None,
            step: None,
            data: FlowData::None,
            asked_questions: HashSet::new(),
            history: MessageRing::default(),
            started_at: now,
            last_active_at: now,
            expires_at: now + window,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Enter a flow at a given step, resetting collected data and the
    /// asked-question guard.
    pub fn enter_flow(&mut self, kind: FlowKind, step: FlowStep, data: FlowData) {
        self.flow = Some(kind);
        self.step = Some(step);
        self.data = data;
        self.asked_questions.clear();
    }

    /// Leave the current flow, keeping history intact.
    pub fn clear_flow(&mut self) {
        self.flow = None;
        self.step = None;
        self.data = FlowData::None;
        self.asked_questions.clear();
    }

    /// Record that a question key was asked. Returns false if it already was.
    pub fn mark_asked(&mut self, key: &str) -> bool {
        self.asked_questions.insert(key.to_string())
    }

    pub fn was_asked(&self, key: &str) -> bool {
        self.asked_questions.contains(key)
    }

    /// Append one message to the bounded history.
    pub fn record(&mut self, sender: Sender, text: impl Into<String>) {
        self.history.push(ChatMessage::new(sender, text));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_has_no_flow() {
        let session = DialogSession::new("anon:abc", false, Duration::minutes(30));
        assert!(session.flow.is_none());
        assert!(session.step.is_none());
        assert_eq!(session.data, FlowData::None);
        assert!(!session.is_expired(Utc::now()));
    }

    #[test]
    fn test_enter_flow_resets_asked_questions() {
        let mut session = DialogSession::new("user:1", true, Duration::hours(24));
        session.mark_asked("service");
        session.enter_flow(
            FlowKind::BuyService,
            FlowStep::AskService,
            FlowData::empty(FlowKind::BuyService),
        );
        assert!(!session.was_asked("service"));
        assert_eq!(session.flow, Some(FlowKind::BuyService));
    }

    #[test]
    fn test_mark_asked_is_idempotent() {
        let mut session = DialogSession::new("user:1", true, Duration::hours(24));
        assert!(session.mark_asked("budget"));
        assert!(!session.mark_asked("budget"));
        assert!(session.was_asked("budget"));
    }

    #[test]
    fn test_expiry_window() {
        let session = DialogSession::new("anon:abc", false, Duration::minutes(-1));
        assert!(session.is_expired(Utc::now()));
    }
}
