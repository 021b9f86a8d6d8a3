//! Transition failure taxonomy

use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum TransitionError {
    /// A configuration mismatch (e.g. a stored status string that no longer
    /// decodes into the state enum). Indicates a bug, not normal traffic.
    #[error("state graph configuration error: {0}")]
    Config(String),

    #[error("entity not found: {0}")]
    NotFound(Uuid),

    /// Illegal edge. Carries the allowed set so callers can render the
    /// legal next actions instead of a generic failure.
    #[error("invalid transition from '{from}' to '{to}' (allowed: {allowed:?})")]
    InvalidTransition {
        from: String,
        to: String,
        allowed: Vec<String>,
    },

    #[error("validation error: {0}")]
    Validation(String),

    #[error("storage error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, TransitionError>;
