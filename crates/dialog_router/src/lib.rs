//! dialog_router - Deterministic routing for the support chat
//!
//! - `routes` - static quick-reply table, checked before any classification
//! - `advance` - per-flow step graphs and the active-flow predicate
//! - `questions` - question texts with anti-repeat and rephrase handling
//! - `classifier` - the intent-classification seam and keyword default

pub mod advance;
pub mod classifier;
pub mod error;
pub mod questions;
pub mod routes;

// Re-exports
pub use advance::{advance_flow, has_active_flow, StepAdvance};
pub use classifier::{IntentClassifier, IntentTag, KeywordClassifier};
pub use error::RouterError;
pub use questions::{is_confused, prompt_for, question_for, Prompt, Question};
pub use routes::{quick_reply_route, RouteTarget};
