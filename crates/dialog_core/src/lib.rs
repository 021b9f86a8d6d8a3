//! dialog_core - Core types for the dialogue subsystem
//!
//! - `flow` - flow/step enums and per-flow collected data
//! - `ring` - bounded message history
//! - `session` - the per-identity dialogue session

pub mod flow;
pub mod ring;
pub mod session;

// Re-exports
pub use flow::{FlowData, FlowKind, FlowStep};
pub use ring::{ChatMessage, MessageRing, Sender, DEFAULT_HISTORY_CAPACITY};
pub use session::DialogSession;
