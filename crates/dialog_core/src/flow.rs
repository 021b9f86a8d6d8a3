//! Flow and step types
//!
//! A session's dialogue position is the two-level address (flow, step).
//! Collected answers live in `FlowData`, a union keyed by flow so each
//! flow declares its own fields and "everything collected" is a typed
//! predicate instead of a runtime bag lookup.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The overall task a session is working through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowKind {
    BuyService,
    OrderStatus,
    InterviewHelp,
    LeadCapture,
}

impl FlowKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BuyService => "buy_service",
            Self::OrderStatus => "order_status",
            Self::InterviewHelp => "interview_help",
            Self::LeadCapture => "lead_capture",
        }
    }
}

/// The current question within a flow, plus the terminal markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowStep {
    // Buy service
    AskService,
    AskBudget,
    ConfirmPurchase,

    // Order status
    AskOrderRef,

    // Interview help
    AskTopic,
    AskSchedule,

    // Lead capture
    AskLeadService,
    AskLeadPlatform,
    AskLeadCountry,
    AskLeadUrgency,
    AskLeadBudget,

    // Terminal markers
    Complete,
    Cancelled,
    Done,
}

impl FlowStep {
    /// A flow positioned on any of these steps is no longer active.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Cancelled | Self::Done)
    }
}

/// Per-flow collected answers.
///
/// One variant per `FlowKind`; fields are `None` until the matching step's
/// answer arrives. Lead capture stores only the draft reference, the draft
/// itself owns its fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "flow", rename_all = "snake_case")]
pub enum FlowData {
    #[default]
    None,
    BuyService {
        service: Option<String>,
        budget: Option<String>,
        confirmed: Option<bool>,
    },
    OrderStatus {
        order_ref: Option<String>,
    },
    InterviewHelp {
        topic: Option<String>,
        schedule: Option<String>,
    },
    LeadCapture {
        draft_id: Uuid,
    },
}

impl FlowData {
    /// Fresh, empty data for one flow.
    pub fn empty(kind: FlowKind) -> Self {
        match kind {
            FlowKind::BuyService => Self::BuyService {
                service: None,
                budget: None,
                confirmed: None,
            },
            FlowKind::OrderStatus => Self::OrderStatus { order_ref: None },
            FlowKind::InterviewHelp => Self::InterviewHelp {
                topic: None,
                schedule: None,
            },
            // Lead capture data is only meaningful with a draft id; callers
            // use `FlowData::LeadCapture` directly.
            FlowKind::LeadCapture => Self::None,
        }
    }

    pub fn kind(&self) -> Option<FlowKind> {
        match self {
            Self::None => None,
            Self::BuyService { .. } => Some(FlowKind::BuyService),
            Self::OrderStatus { .. } => Some(FlowKind::OrderStatus),
            Self::InterviewHelp { .. } => Some(FlowKind::InterviewHelp),
            Self::LeadCapture { .. } => Some(FlowKind::LeadCapture),
        }
    }

    /// Whether this flow has collected everything it needs.
    pub fn is_complete(&self) -> bool {
        match self {
            Self::None => false,
            Self::BuyService {
                service,
                budget,
                confirmed,
            } => service.is_some() && budget.is_some() && confirmed.is_some(),
            Self::OrderStatus { order_ref } => order_ref.is_some(),
            Self::InterviewHelp { topic, schedule } => topic.is_some() && schedule.is_some(),
            // Completion of a lead draft is judged by the draft itself.
            Self::LeadCapture { .. } => false,
        }
    }
}
