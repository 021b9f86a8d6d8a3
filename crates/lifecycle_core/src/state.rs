//! State graphs - per-entity-type transition tables
//!
//! Each entity type declares its legal edges through an exhaustive match in
//! `allowed_next`. Adding a state variant without extending the match is a
//! compile error, so a state with no graph entry cannot exist at runtime.

use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::audit::{AuditEntry, TimelineEntry};

/// The closed set of entity types governed by the transition engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Order,
    Ticket,
    Rental,
    WalletTransaction,
}

impl EntityKind {
    /// The lowercase token used as the event namespace (`"order.delivered"`).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Order => "order",
            Self::Ticket => "ticket",
            Self::Rental => "rental",
            Self::WalletTransaction => "wallet_transaction",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A status value participating in a state graph.
///
/// Terminal states return an empty slice from `allowed_next`.
pub trait EntityState:
    Copy + Clone + PartialEq + Eq + Hash + fmt::Debug + Send + Sync + 'static
{
    /// Every state of this type, in declaration order. Used to render the
    /// full transition table for introspection.
    const ALL: &'static [Self];

    /// The states legally reachable from this one.
    fn allowed_next(self) -> &'static [Self];

    /// The lowercase wire name of this state.
    fn as_str(self) -> &'static str;

    /// A state with no outgoing edges.
    fn is_terminal(self) -> bool {
        self.allowed_next().is_empty()
    }

    /// Whether `next` is a legal edge from this state.
    fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next().contains(&next)
    }
}

/// Render the full `state -> allowed next states` table for one entity type.
///
/// Intended for UI rendering of legal next actions and for exhaustiveness
/// checks in tests.
pub fn transition_table<S: EntityState>() -> Vec<(S, &'static [S])> {
    S::ALL.iter().map(|s| (*s, s.allowed_next())).collect()
}

/// A record whose `status` field is governed by the transition engine.
///
/// The engine mutates status and logs; creation and deletion stay with the
/// owning domain module.
pub trait Lifecycle: Clone + Serialize + Send + Sync + 'static {
    /// The state graph this record's status lives in.
    type State: EntityState;

    /// The entity type, used for event namespacing.
    const KIND: EntityKind;

    fn id(&self) -> Uuid;

    fn state(&self) -> Self::State;

    fn set_state(&mut self, next: Self::State);

    /// Append one structured audit entry. Entries are never edited or removed.
    fn push_audit(&mut self, entry: AuditEntry<Self::State>);

    /// Append one human-readable timeline entry.
    fn push_timeline(&mut self, entry: TimelineEntry);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{OrderState, TicketState};

    #[test]
    fn test_entity_kind_tokens() {
        assert_eq!(EntityKind::Order.as_str(), "order");
        assert_eq!(EntityKind::WalletTransaction.as_str(), "wallet_transaction");
    }

    #[test]
    fn test_transition_table_covers_all_states() {
        let table = transition_table::<TicketState>();
        assert_eq!(table.len(), TicketState::ALL.len());

        // Terminal states appear with an empty allowed set rather than
        // being absent from the table.
        let (_, closed_allowed) = table
            .iter()
            .find(|(s, _)| *s == TicketState::Closed)
            .unwrap();
        assert!(closed_allowed.is_empty());
    }

    #[test]
    fn test_every_reachable_state_is_listed() {
        // Each edge target must itself be a key of the table.
        for (_, allowed) in transition_table::<OrderState>() {
            for next in allowed {
                assert!(OrderState::ALL.contains(next));
            }
        }
    }
}
