//! Service orders
//!
//! ```text
//! pending ──▶ in_progress ──▶ delivered ──▶ completed
//!    │             │              │
//!    │             ├──▶ disputed ◀┘
//!    │             │        │
//!    ▼             ▼        ▼
//! cancelled ◀──────┴── completed | cancelled
//! ```
//!
//! Entry into `in_progress` from `pending` marks the order as paid.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::audit::{AuditEntry, TimelineEntry};
use crate::state::{EntityKind, EntityState, Lifecycle};

/// Lifecycle states of a service order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderState {
    /// Placed, payment not yet confirmed.
    Pending,
    /// Paid; the seller is working.
    InProgress,
    /// The seller marked the work as delivered.
    Delivered,
    /// Buyer accepted the delivery. Terminal.
    Completed,
    /// Either side opened a dispute.
    Disputed,
    /// Terminal.
    Cancelled,
}

impl EntityState for OrderState {
    const ALL: &'static [Self] = &[
        Self::Pending,
        Self::InProgress,
        Self::Delivered,
        Self::Completed,
        Self::Disputed,
        Self::Cancelled,
    ];

    fn allowed_next(self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::InProgress, Self::Cancelled],
            Self::InProgress => &[Self::Delivered, Self::Cancelled, Self::Disputed],
            Self::Delivered => &[Self::Completed, Self::Disputed],
            Self::Disputed => &[Self::Completed, Self::Cancelled],
            Self::Completed => &[],
            Self::Cancelled => &[],
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Delivered => "delivered",
            Self::Completed => "completed",
            Self::Disputed => "disputed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// A buyer's order for one catalog service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub buyer_id: String,
    pub service_id: String,
    /// Price in minor currency units.
    pub amount_cents: i64,
    pub status: OrderState,
    /// Stamped once, when payment is confirmed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<DateTime<Utc>>,
    /// Stamped on entry into a terminal state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub audit_log: Vec<AuditEntry<OrderState>>,
    #[serde(default)]
    pub timeline: Vec<TimelineEntry>,
}

impl Order {
    pub fn new(buyer_id: impl Into<String>, service_id: impl Into<String>, amount_cents: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            buyer_id: buyer_id.into(),
            service_id: service_id.into(),
            amount_cents,
            status: OrderState::Pending,
            paid_at: None,
            completed_at: None,
            created_at: Utc::now(),
            audit_log: Vec::new(),
            timeline: Vec::new(),
        }
    }
}

impl Lifecycle for Order {
    type State = OrderState;

    const KIND: EntityKind = EntityKind::Order;

    fn id(&self) -> Uuid {
        self.id
    }

    fn state(&self) -> OrderState {
        self.status
    }

    fn set_state(&mut self, next: OrderState) {
        self.status = next;
    }

    fn push_audit(&mut self, entry: AuditEntry<OrderState>) {
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
    fn test_pending_edges() {
        assert!(OrderState::Pending.can_transition_to(OrderState::InProgress));
        assert!(OrderState::Pending.can_transition_to(OrderState::Cancelled));
        assert!(!OrderState::Pending.can_transition_to(OrderState::Delivered));
    }

    #[test]
    fn test_completed_is_terminal() {
        assert!(OrderState::Completed.is_terminal());
        assert!(OrderState::Cancelled.is_terminal());
        assert!(!OrderState::Disputed.is_terminal());
    }

    #[test]
    fn test_new_order_starts_pending() {
        let order = Order::new("buyer-1", "svc-logo-design", 15_000);
        assert_eq!(order.status, OrderState::Pending);
        assert!(order.paid_at.is_none());
        assert!(order.audit_log.is_empty());
    }
}
