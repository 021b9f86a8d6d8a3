//! Support tickets
//!
//! `closed` is terminal: a closed ticket cannot be reopened, a new one is
//! filed instead.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::audit::{AuditEntry, TimelineEntry};
use crate::state::{EntityKind, EntityState, Lifecycle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketState {
    Open,
    InProgress,
    /// An agent replied; waiting on the customer.
    Answered,
    Closed,
}

impl EntityState for TicketState {
    const ALL: &'static [Self] = &[Self::Open, Self::InProgress, Self::Answered, Self::Closed];

    fn allowed_next(self) -> &'static [Self] {
        match self {
            Self::Open => &[Self::InProgress, Self::Closed],
            Self::InProgress => &[Self::Answered, Self::Closed],
            Self::Answered => &[Self::InProgress, Self::Closed],
            Self::Closed => &[],
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Answered => "answered",
            Self::Closed => "closed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub id: Uuid,
    pub reporter_id: String,
    pub subject: String,
    pub status: TicketState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub audit_log: Vec<AuditEntry<TicketState>>,
    #[serde(default)]
    pub timeline: Vec<TimelineEntry>,
}

impl Ticket {
    pub fn new(reporter_id: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            reporter_id: reporter_id.into(),
            subject: subject.into(),
            status: TicketState::Open,
            closed_at: None,
            created_at: Utc::now(),
            audit_log: Vec::new(),
            timeline: Vec::new(),
        }
    }
}

impl Lifecycle for Ticket {
    type State = TicketState;

    const KIND: EntityKind = EntityKind::Ticket;

    fn id(&self) -> Uuid {
        self.id
    }

    fn state(&self) -> TicketState {
        self.status
    }

    fn set_state(&mut self, next: TicketState) {
        self.status = next;
    }

    fn push_audit(&mut self, entry: AuditEntry<TicketState>) {
        self.audit_log.push(entry);
    }

    fn push_timeline(&mut self, entry: TimelineEntry) {
        self.timeline.push(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closed_has_no_edges() {
        assert!(TicketState::Closed.allowed_next().is_empty());
        assert!(!TicketState::Closed.can_transition_to(TicketState::InProgress));
    }

    #[test]
    fn test_answered_can_bounce_back() {
        assert!(TicketState::Answered.can_transition_to(TicketState::InProgress));
    }
}
