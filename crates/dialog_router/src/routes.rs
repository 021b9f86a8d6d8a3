//! Quick-reply routes
//!
//! Static table consulted before any free-text classification, so a button
//! click always lands on a deterministic flow entry regardless of
//! heuristic drift elsewhere.

use dialog_core::{FlowKind, FlowStep};

/// Where a quick-reply trigger drops the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteTarget {
    pub flow: FlowKind,
    pub step: FlowStep,
}

const QUICK_REPLY_ROUTES: &[(&str, RouteTarget)] = &[
    (
        "buy service",
        RouteTarget {
            flow: FlowKind::BuyService,
            step: FlowStep::AskService,
        },
    ),
    (
        "order status",
        RouteTarget {
            flow: FlowKind::OrderStatus,
            step: FlowStep::AskOrderRef,
        },
    ),
    (
        "interview help",
        RouteTarget {
            flow: FlowKind::InterviewHelp,
            step: FlowStep::AskTopic,
        },
    ),
];

/// Exact-or-substring match against the static table, case-insensitive.
pub fn quick_reply_route(text: &str) -> Option<RouteTarget> {
    let normalized = text.trim().to_lowercase();
    if normalized.is_empty() {
        return None;
    }
    QUICK_REPLY_ROUTES
        .iter()
        .find(|(trigger, _)| normalized == *trigger || normalized.contains(trigger))
        .map(|(_, target)| *target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        let target = quick_reply_route("Buy service").unwrap();
        assert_eq!(target.flow, FlowKind::BuyService);
        assert_eq!(target.step, FlowStep::AskService);
    }

    #[test]
    fn test_substring_match() {
        let target = quick_reply_route("hey, what's my order status please").unwrap();
        assert_eq!(target.flow, FlowKind::OrderStatus);
    }

    #[test]
    fn test_no_match_for_free_text() {
        assert!(quick_reply_route("hello there").is_none());
        assert!(quick_reply_route("").is_none());
    }
}
