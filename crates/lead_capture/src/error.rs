//! Lead capture error types

use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum LeadError {
    /// The answer did not validate for the field being asked. The draft is
    /// left unchanged and the question is re-posed (rephrased).
    #[error("invalid answer for {field}: {message}")]
    Validation { field: String, message: String },

    /// The draft already left `draft` status; no further answers accepted.
    #[error("lead draft is already {status}")]
    AlreadyClosed { status: String },

    #[error("lead draft not found: {0}")]
    NotFound(Uuid),

    #[error("storage error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, LeadError>;
