//! lead_capture - Structured lead collection from unstructured chat
//!
//! When no catalog item matches a service request, a draft lead is opened
//! and filled one answer at a time. The draft has its own tiny state
//! machine (`draft -> new | cancelled`) and an append-only event log with
//! the same shape as the entity audit trail.

pub mod draft;
pub mod error;
pub mod flow;
pub mod store;

// Re-exports
pub use draft::{next_lead_question, BudgetAnswer, LeadDraft, LeadField, LeadStatus, Urgency};
pub use error::{LeadError, Result};
pub use flow::{apply_answer, cancel, is_cancel, LeadProgress};
pub use store::{LeadStore, MemoryLeadStore};
