//! lifecycle_core - Entity lifecycle types shared across the orchestration core
//!
//! This crate provides the foundational types for the lifecycle subsystem:
//! - `state` - the `EntityState` trait and per-type transition graphs
//! - `audit` - append-only audit and timeline entries
//! - `entities` - Order, Ticket, Rental, WalletTransaction records
//! - `error` - the transition failure taxonomy

pub mod audit;
pub mod entities;
pub mod error;
pub mod state;

// Re-export commonly used types
pub use audit::{AuditEntry, TimelineEntry, TransitionMeta};
pub use entities::{
    Order, OrderState, Rental, RentalState, Ticket, TicketState, WalletTransaction, WalletTxState,
};
pub use error::{Result, TransitionError};
pub use state::{transition_table, EntityKind, EntityState, Lifecycle};
