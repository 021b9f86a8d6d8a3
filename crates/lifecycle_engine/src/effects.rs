//! Derived effects
//!
//! Type-specific field updates applied when specific edges fire. Supplied
//! by the owning domain module and injected into the engine; the engine
//! itself knows nothing about paid-at timestamps or settlement.

use chrono::Utc;

use lifecycle_core::{
    Lifecycle, Order, OrderState, Rental, RentalState, Ticket, TicketState, TransitionMeta,
    WalletTransaction, WalletTxState,
};

/// Domain logic run between the status mutation and the persist.
///
/// `apply` sees the entity with `status` already set to `to`; whatever it
/// writes is persisted in the same save as the status change.
pub trait DerivedEffects<E: Lifecycle>: Send + Sync {
    fn apply(&self, entity: &mut E, from: E::State, to: E::State, meta: &TransitionMeta);
}

/// Default for entity types with no derived fields.
pub struct NoEffects;

impl<E: Lifecycle> DerivedEffects<E> for NoEffects {
    fn apply(&self, _entity: &mut E, _from: E::State, _to: E::State, _meta: &TransitionMeta) {}
}

/// Order: the `pending -> in_progress` edge is payment confirmation.
pub struct OrderEffects;

impl DerivedEffects<Order> for OrderEffects {
    fn apply(&self, order: &mut Order, from: OrderState, to: OrderState, _meta: &TransitionMeta) {
        // Only the specific payment edge stamps paid_at; the graph rejects
        // a second pending -> in_progress, so the stamp happens once.
        if from == OrderState::Pending && to == OrderState::InProgress {
            order.paid_at = Some(Utc::now());
        }
        if matches!(to, OrderState::Completed | OrderState::Cancelled) {
            order.completed_at = Some(Utc::now());
        }
    }
}

pub struct TicketEffects;

impl DerivedEffects<Ticket> for TicketEffects {
    fn apply(&self, ticket: &mut Ticket, _from: TicketState, to: TicketState, _meta: &TransitionMeta) {
        if to == TicketState::Closed {
            ticket.closed_at = Some(Utc::now());
        }
    }
}

pub struct RentalEffects;

impl DerivedEffects<Rental> for RentalEffects {
    fn apply(&self, rental: &mut Rental, from: RentalState, to: RentalState, _meta: &TransitionMeta) {
        if from == RentalState::Expired && to == RentalState::Renewed {
            rental.renewed_at = Some(Utc::now());
        }
        if matches!(to, RentalState::Closed | RentalState::Cancelled) {
            rental.closed_at = Some(Utc::now());
        }
    }
}

pub struct WalletEffects;

impl DerivedEffects<WalletTransaction> for WalletEffects {
    fn apply(
        &self,
        tx: &mut WalletTransaction,
        _from: WalletTxState,
        to: WalletTxState,
        _meta: &TransitionMeta,
    ) {
        if to == WalletTxState::Completed {
            tx.settled_at = Some(Utc::now());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_paid_at_only_on_payment_edge() {
        let mut order = Order::new("buyer-1", "svc-1", 9_900);
        let meta = TransitionMeta::default();

        OrderEffects.apply(
            &mut order,
            OrderState::InProgress,
            OrderState::Delivered,
            &meta,
        );
        assert!(order.paid_at.is_none());

        OrderEffects.apply(
            &mut order,
            OrderState::Pending,
            OrderState::InProgress,
            &meta,
        );
        assert!(order.paid_at.is_some());
    }

    #[test]
    fn test_ticket_closed_at_on_terminal_entry() {
        let mut ticket = Ticket::new("user-1", "refund request");
        TicketEffects.apply(
            &mut ticket,
            TicketState::Open,
            TicketState::Closed,
            &TransitionMeta::default(),
        );
        assert!(ticket.closed_at.is_some());
    }

    #[test]
    fn test_rental_renewal_stamp() {
        let mut rental = Rental::new("renter-1", "listing-1", Utc::now());
        RentalEffects.apply(
            &mut rental,
            RentalState::Expired,
            RentalState::Renewed,
            &TransitionMeta::default(),
        );
        assert!(rental.renewed_at.is_some());
        assert!(rental.closed_at.is_none());
    }
}
