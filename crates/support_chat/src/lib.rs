//! support_chat - The dialogue layer's single entry point
//!
//! Composes identity resolution, the session store, the dialog router and
//! lead capture into one `chat()` call that never surfaces a hard error:
//! every failure path degrades to a short, safe reply with actionable
//! quick replies.

pub mod chat;
pub mod provider;
pub mod replies;

// Re-exports
pub use chat::{ChatReply, ChatRequest, SessionMeta, SupportChat};
pub use provider::{ProviderError, ReplyModel};
pub use replies::MENU_QUICK_REPLIES;
