//! lifecycle_engine - Validated entity state transitions
//!
//! This crate executes single state changes against the per-type graphs in
//! `lifecycle_core`:
//! - `repository` - the storage seam injected at construction
//! - `effects` - type-specific derived fields (paid-at, closed-at, ...)
//! - `engine` - transition / can_transition / batch_transition

pub mod effects;
pub mod engine;
pub mod repository;

// Re-exports
pub use effects::{
    DerivedEffects, NoEffects, OrderEffects, RentalEffects, TicketEffects, WalletEffects,
};
pub use engine::{BatchOutcome, TransitionCheck, TransitionEngine};
pub use repository::{EntityRepository, MemoryRepository};
