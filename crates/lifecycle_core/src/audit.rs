//! Audit trail types
//!
//! Every successful transition appends exactly one `AuditEntry` and one
//! `TimelineEntry` to the owning record. Both logs are append-only and
//! insertion-ordered.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Caller-supplied metadata attached to a transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionMeta {
    /// Who initiated the change ("system", a user id, an admin id).
    pub actor: String,

    /// Optional free-form reason surfaced in the audit trail.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Structured payload forwarded to audit entries and published events.
    #[serde(default)]
    pub data: serde_json::Value,
}

impl Default for TransitionMeta {
    fn default() -> Self {
        Self {
            actor: "system".to_string(),
            reason: None,
            data: serde_json::Value::Null,
        }
    }
}

impl TransitionMeta {
    /// Metadata attributed to a specific actor.
    pub fn by(actor: impl Into<String>) -> Self {
        Self {
            actor: actor.into(),
            ..Self::default()
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }
}

/// One structured, append-only audit record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry<S> {
    /// Namespaced event name, e.g. `"order.in_progress"`.
    pub event: String,

    /// State before the transition.
    pub from: S,

    /// State after the transition.
    pub to: S,

    /// When the transition was applied.
    pub at: DateTime<Utc>,

    /// Who initiated the change.
    pub actor: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    #[serde(default)]
    pub meta: serde_json::Value,
}

/// One human-readable log line for end-user timelines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub at: DateTime<Utc>,
    pub actor: String,
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_defaults_to_system_actor() {
        let meta = TransitionMeta::default();
        assert_eq!(meta.actor, "system");
        assert!(meta.reason.is_none());
        assert!(meta.data.is_null());
    }

    #[test]
    fn test_meta_builder() {
        let meta = TransitionMeta::by("user:42")
            .with_reason("payment confirmed")
            .with_data(serde_json::json!({ "gateway": "stripe" }));
        assert_eq!(meta.actor, "user:42");
        assert_eq!(meta.reason.as_deref(), Some("payment confirmed"));
        assert_eq!(meta.data["gateway"], "stripe");
    }
}
