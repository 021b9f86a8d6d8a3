//! Intent classification seam
//!
//! The router consumes a pure, deterministic classifier; the keyword
//! implementation below is the default. A learned classifier can be
//! swapped in behind the same trait without touching routing logic.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentTag {
    Greeting,
    BuyService,
    OrderStatus,
    InterviewHelp,
    /// A service request that no catalog item matches; feeds lead capture.
    ServiceRequest,
    Cancel,
    Smalltalk,
    Unknown,
}

/// Pure function from text to intent. No I/O, deterministic.
pub trait IntentClassifier: Send + Sync {
    fn classify(&self, text: &str) -> IntentTag;
}

/// Keyword-based default classifier.
#[derive(Default)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    pub fn new() -> Self {
        Self
    }
}

const GREETINGS: &[&str] = &["hi", "hello", "hey", "salam", "good morning", "good evening"];
const CANCEL_WORDS: &[&str] = &["cancel", "never mind", "nevermind", "forget it", "stop"];
const SERVICE_WORDS: &[&str] = &["i need", "i want", "looking for", "can you do", "can someone"];
const SMALLTALK_WORDS: &[&str] = &["how are you", "thank", "thanks", "who are you", "what can you do"];

impl IntentClassifier for KeywordClassifier {
    fn classify(&self, text: &str) -> IntentTag {
        let normalized = text.trim().to_lowercase();
        if normalized.is_empty() {
            return IntentTag::Unknown;
        }

        if CANCEL_WORDS.iter().any(|w| normalized.contains(w)) {
            return IntentTag::Cancel;
        }
        if normalized.contains("buy service") {
            return IntentTag::BuyService;
        }
        if normalized.contains("order status") || normalized.contains("my order") {
            return IntentTag::OrderStatus;
        }
        if normalized.contains("interview") {
            return IntentTag::InterviewHelp;
        }
        if SERVICE_WORDS.iter().any(|w| normalized.contains(w)) {
            return IntentTag::ServiceRequest;
        }
        if GREETINGS.iter().any(|g| {
            normalized == *g || normalized.starts_with(&format!("{g} ")) || normalized.starts_with(&format!("{g},"))
        }) {
            return IntentTag::Greeting;
        }
        if SMALLTALK_WORDS.iter().any(|w| normalized.contains(w)) {
            return IntentTag::Smalltalk;
        }

        IntentTag::Unknown
    }
}
