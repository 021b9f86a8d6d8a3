//! Account rentals
//!
//! An expired rental can be renewed (`expired -> renewed -> active`) or
//! closed, but never jumps straight back to `active`. The expiry sweep
//! relies on the status field itself as its idempotence marker: a second
//! sweep run finds the rental already `expired` and the duplicate edge is
//! rejected by the graph.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::audit::{AuditEntry, TimelineEntry};
use crate::state::{EntityKind, EntityState, Lifecycle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RentalState {
    Pending,
    Active,
    Expired,
    /// Payment received for another term; re-enters `active`.
    Renewed,
    Closed,
    Cancelled,
}

impl EntityState for RentalState {
    const ALL: &'static [Self] = &[
        Self::Pending,
        Self::Active,
        Self::Expired,
        Self::Renewed,
        Self::Closed,
        Self::Cancelled,
    ];

    fn allowed_next(self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::Active, Self::Cancelled],
            Self::Active => &[Self::Expired, Self::Cancelled],
            Self::Expired => &[Self::Renewed, Self::Closed],
            Self::Renewed => &[Self::Active],
            Self::Closed => &[],
            Self::Cancelled => &[],
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Expired => "expired",
            Self::Renewed => "renewed",
            Self::Closed => "closed",
            Self::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rental {
    pub id: Uuid,
    pub renter_id: String,
    pub listing_id: String,
    pub status: RentalState,
    /// End of the current paid term.
    pub term_ends_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub renewed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub audit_log: Vec<AuditEntry<RentalState>>,
    #[serde(default)]
    pub timeline: Vec<TimelineEntry>,
}

impl Rental {
    pub fn new(
        renter_id: impl Into<String>,
        listing_id: impl Into<String>,
        term_ends_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            renter_id: renter_id.into(),
            listing_id: listing_id.into(),
            status: RentalState::Pending,
            term_ends_at,
            renewed_at: None,
            closed_at: None,
            created_at: Utc::now(),
            audit_log: Vec::new(),
            timeline: Vec::new(),
        }
    }
}

impl Lifecycle for Rental {
    type State = RentalState;

    const KIND: EntityKind = EntityKind::Rental;

    fn id(&self) -> Uuid {
        self.id
    }

    fn state(&self) -> RentalState {
        self.status
    }

    fn set_state(&mut self, next: RentalState) {
        self.status = next;
    }

    fn push_audit(&mut self, entry: AuditEntry<RentalState>) {
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
    fn test_expired_can_renew_but_not_reactivate() {
        assert!(RentalState::Expired.can_transition_to(RentalState::Renewed));
        assert!(!RentalState::Expired.can_transition_to(RentalState::Active));
    }

    #[test]
    fn test_renewed_reenters_active() {
        assert_eq!(RentalState::Renewed.allowed_next(), &[RentalState::Active]);
    }

    #[test]
    fn test_duplicate_expiry_sweep_is_rejected() {
        // The sweep's write-time idempotence guard.
        assert!(!RentalState::Expired.can_transition_to(RentalState::Expired));
    }
}
