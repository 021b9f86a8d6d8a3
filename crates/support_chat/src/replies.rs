//! Canned reply texts
//!
//! Deterministic wording for the menu, fallbacks and acknowledgements.
//! Everything user-visible that is not a flow question lives here.

use uuid::Uuid;

/// The menu buttons offered whenever no flow is active.
pub const MENU_QUICK_REPLIES: [&str; 3] = ["Buy service", "Order status", "Interview help"];

pub const MENU_TEXT: &str =
    "Hi! Here's what I can help with. Pick one below, or just describe what you need.";

/// Shown when an internal failure is absorbed; never a protocol error.
pub const FALLBACK_TEXT: &str =
    "Sorry, something went wrong on my side. Here's what I can help with in the meantime.";

pub const SMALLTALK_FALLBACK: &str =
    "I'm the support assistant. I can help you order services, check an order, or prepare for an interview.";

pub const NOTHING_TO_CANCEL: &str = "There's nothing in progress to cancel. Anything else?";

pub const FLOW_CANCELLED: &str = "Okay, I've stopped that. Anything else?";

pub const LEAD_CANCELLED: &str =
    "No problem, I've cancelled that request. You can start again any time.";

pub fn lead_created_reply(id: Uuid) -> String {
    format!(
        "Thanks! I've passed your request to our team. Your reference is {id}. \
         Someone will get back to you shortly."
    )
}

pub fn order_placed_reply(service: &str) -> String {
    format!("Great, I've set up your order for \"{service}\". You'll get a confirmation shortly.")
}

pub fn order_status_reply(order_ref: &str) -> String {
    format!("Thanks! I'm pulling up order {order_ref}, you'll see its current status in a moment.")
}

pub fn interview_booked_reply(topic: &str) -> String {
    format!("All set, we'll prepare {topic} interview material for your session.")
}
