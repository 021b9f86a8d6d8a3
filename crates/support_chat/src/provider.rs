//! Reply model seam
//!
//! The optional LLM-backed smalltalk provider. Implementations carry their
//! own timeout; every failure is absorbed by the chat layer and mapped to
//! a deterministic fallback, never surfaced to the end user.

use async_trait::async_trait;
use thiserror::Error;

use dialog_core::ChatMessage;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("provider timed out")]
    Timeout,

    #[error("provider unavailable: {0}")]
    Unavailable(String),

    #[error("malformed provider response: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait ReplyModel: Send + Sync {
    /// Produce an assistant reply from the bounded message history.
    async fn complete(&self, history: &[ChatMessage]) -> Result<String, ProviderError>;
}
