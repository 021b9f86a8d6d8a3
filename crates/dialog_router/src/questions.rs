//! Question texts and anti-repeat tracking
//!
//! Once a question key has been asked in the current flow it is never
//! emitted again verbatim. The single allowed repeat is the rephrased
//! variant, and only when the incoming message matches a confusion
//! pattern while the question was already asked once.

use dialog_core::{DialogSession, FlowStep};
use tracing::debug;

/// One question as presented to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Question {
    /// Stable key stored in `asked_questions`.
    pub key: &'static str,
    pub text: &'static str,
    /// Simpler wording, used only after a confusion signal.
    pub rephrased: &'static str,
}

const QUESTIONS: &[(FlowStep, Question)] = &[
    (
        FlowStep::AskService,
        Question {
            key: "buy_service.service",
            text: "Which service would you like to order?",
            rephrased: "Tell me the name of the service you want to buy, for example \"logo design\".",
        },
    ),
    (
        FlowStep::AskBudget,
        Question {
            key: "buy_service.budget",
            text: "What budget do you have in mind?",
            rephrased: "Roughly how much do you want to spend? A ballpark number is fine.",
        },
    ),
    (
        FlowStep::ConfirmPurchase,
        Question {
            key: "buy_service.confirm",
            text: "Shall I create the order? (yes/no)",
            rephrased: "Reply \"yes\" to place the order, or \"no\" to stop here.",
        },
    ),
    (
        FlowStep::AskOrderRef,
        Question {
            key: "order_status.order_ref",
            text: "What's your order reference?",
            rephrased: "Please paste the order number from your confirmation email, e.g. ORD-1042.",
        },
    ),
    (
        FlowStep::AskTopic,
        Question {
            key: "interview_help.topic",
            text: "What topic is your interview about?",
            rephrased: "Which subject should we prepare for, for example \"frontend\" or \"accounting\"?",
        },
    ),
    (
        FlowStep::AskSchedule,
        Question {
            key: "interview_help.schedule",
            text: "When is the interview scheduled?",
            rephrased: "On what date and time will the interview take place?",
        },
    ),
    (
        FlowStep::AskLeadService,
        Question {
            key: "lead.requested_service",
            text: "What service are you looking for?",
            rephrased: "Describe in a few words what you need done.",
        },
    ),
    (
        FlowStep::AskLeadPlatform,
        Question {
            key: "lead.platform",
            text: "Which platform is this for?",
            rephrased: "Where should the work happen, for example \"web\", \"iOS\" or \"Instagram\"?",
        },
    ),
    (
        FlowStep::AskLeadCountry,
        Question {
            key: "lead.country",
            text: "Which country are you in?",
            rephrased: "Please name the country you're located in.",
        },
    ),
    (
        FlowStep::AskLeadUrgency,
        Question {
            key: "lead.urgency",
            text: "How urgent is this?",
            rephrased: "Do you need this done urgently, soon, or is there no rush?",
        },
    ),
    (
        FlowStep::AskLeadBudget,
        Question {
            key: "lead.budget",
            text: "Do you have a budget in mind? (you can say \"skip\")",
            rephrased: "If you know how much you want to spend, tell me; otherwise reply \"skip\".",
        },
    ),
];

const CONFUSION_PATTERNS: &[&str] = &[
    "i don't understand",
    "i dont understand",
    "don't get it",
    "dont get it",
    "what do you mean",
    "can you explain",
    "confused",
    "huh",
];

/// The question attached to a step, if the step asks one.
pub fn question_for(step: FlowStep) -> Option<&'static Question> {
    QUESTIONS.iter().find(|(s, _)| *s == step).map(|(_, q)| q)
}

/// Whether a message signals the user did not understand the question.
pub fn is_confused(text: &str) -> bool {
    let normalized = text.trim().to_lowercase();
    CONFUSION_PATTERNS.iter().any(|p| normalized.contains(p))
}

/// What asking `step` should emit this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    /// First time: the canonical wording. The key is recorded.
    First(&'static str),
    /// Already asked and the user signalled confusion: the rephrased wording.
    Rephrased(&'static str),
    /// Already asked, no confusion signal. The caller must not repeat the
    /// question verbatim.
    Suppressed,
}

/// Resolve the prompt for `step`, enforcing the anti-repeat invariant.
pub fn prompt_for(session: &mut DialogSession, step: FlowStep, incoming: &str) -> Option<Prompt> {
    let question = question_for(step)?;

    if session.mark_asked(question.key) {
        return Some(Prompt::First(question.text));
    }

    if is_confused(incoming) {
        debug!(key = question.key, "rephrasing after confusion signal");
        return Some(Prompt::Rephrased(question.rephrased));
    }

    Some(Prompt::Suppressed)
}
