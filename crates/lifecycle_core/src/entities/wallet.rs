//! Wallet transactions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::audit::{AuditEntry, TimelineEntry};
use crate::state::{EntityKind, EntityState, Lifecycle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalletTxState {
    Pending,
    Completed,
    Failed,
    /// A completed transaction clawed back by support. Terminal.
    Reversed,
}

impl EntityState for WalletTxState {
    const ALL: &'static [Self] = &[Self::Pending, Self::Completed, Self::Failed, Self::Reversed];

    fn allowed_next(self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::Completed, Self::Failed],
            Self::Completed => &[Self::Reversed],
            Self::Failed => &[],
            Self::Reversed => &[],
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Reversed => "reversed",
        }
    }
}

/// One credit or debit against a user wallet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletTransaction {
    pub id: Uuid,
    pub wallet_id: String,
    /// Signed amount in minor currency units; negative for debits.
    pub amount_cents: i64,
    pub status: WalletTxState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub audit_log: Vec<AuditEntry<WalletTxState>>,
    #[serde(default)]
    pub timeline: Vec<TimelineEntry>,
}

impl WalletTransaction {
    pub fn new(wallet_id: impl Into<String>, amount_cents: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            wallet_id: wallet_id.into(),
            amount_cents,
            status: WalletTxState::Pending,
            settled_at: None,
            created_at: Utc::now(),
            audit_log: Vec::new(),
            timeline: Vec::new(),
        }
    }
}

impl Lifecycle for WalletTransaction {
    type State = WalletTxState;

    const KIND: EntityKind = EntityKind::WalletTransaction;

    fn id(&self) -> Uuid {
        self.id
    }

    fn state(&self) -> WalletTxState {
        self.status
    }

    fn set_state(&mut self, next: WalletTxState) {
        self.status = next;
    }

    fn push_audit(&mut self, entry: AuditEntry<WalletTxState>) {
        self.audit_log.push(entry);
    }

    fn push_timeline(&mut self, entry: TimelineEntry) {
        self.timeline.push(entry);
    }
}
