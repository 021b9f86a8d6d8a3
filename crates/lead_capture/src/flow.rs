//! Answer handling
//!
//! Validates one free-text answer against the field being asked, mutates
//! the draft, and reports where the form stands. An explicit cancel phrase
//! closes the draft immediately from any unset-field step.

use serde_json::json;
use tracing::{debug, info};

use lifecycle_core::EntityState;

use crate::draft::{next_lead_question, BudgetAnswer, LeadDraft, LeadField, LeadStatus, Urgency};
use crate::error::{LeadError, Result};

const CANCEL_PHRASES: &[&str] = &["cancel", "never mind", "nevermind", "forget it", "stop"];

const BUDGET_SKIP_WORDS: &[&str] = &["skip", "no", "none", "not sure", "dont know", "don't know"];

const MAX_ANSWER_LEN: usize = 200;

/// Whether a message is an explicit cancel request.
pub fn is_cancel(text: &str) -> bool {
    let normalized = text.trim().to_lowercase();
    CANCEL_PHRASES
        .iter()
        .any(|p| normalized == *p || normalized.starts_with(&format!("{p} ")))
}

/// Where the form stands after one accepted answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeadProgress {
    /// More to collect; ask this field next.
    NextQuestion(LeadField),
    /// All fields resolved; the draft became a lead.
    Created { id: uuid::Uuid },
    /// The user cancelled; the draft is closed.
    Cancelled,
}

fn ensure_open(draft: &LeadDraft) -> Result<()> {
    if draft.status != LeadStatus::Draft {
        return Err(LeadError::AlreadyClosed {
            status: draft.status.as_str().to_string(),
        });
    }
    Ok(())
}

fn validate_text(field: LeadField, answer: &str) -> Result<String> {
    let trimmed = answer.trim();
    if trimmed.is_empty() {
        return Err(LeadError::Validation {
            field: field.as_str().to_string(),
            message: "answer is empty".to_string(),
        });
    }
    if trimmed.len() > MAX_ANSWER_LEN {
        return Err(LeadError::Validation {
            field: field.as_str().to_string(),
            message: format!("answer exceeds {MAX_ANSWER_LEN} characters"),
        });
    }
    Ok(trimmed.to_string())
}

/// Apply one answer to the field currently being asked.
///
/// A cancel phrase wins over field validation: it closes the draft from
/// any step without requiring the remaining fields. An invalid answer
/// leaves the draft untouched.
pub fn apply_answer(draft: &mut LeadDraft, field: LeadField, answer: &str) -> Result<LeadProgress> {
    ensure_open(draft)?;

    if is_cancel(answer) {
        cancel(draft)?;
        return Ok(LeadProgress::Cancelled);
    }

    match field {
        LeadField::RequestedService => {
            draft.requested_service = Some(validate_text(field, answer)?);
        }
        LeadField::Platform => {
            draft.platform = Some(validate_text(field, answer)?);
        }
        LeadField::Country => {
            draft.country = Some(validate_text(field, answer)?);
        }
        LeadField::Urgency => {
            let parsed = Urgency::parse(answer).ok_or_else(|| LeadError::Validation {
                field: field.as_str().to_string(),
                message: "could not read an urgency level from the answer".to_string(),
            })?;
            draft.urgency = Some(parsed);
        }
        LeadField::Budget => {
            let normalized = answer.trim().to_lowercase();
            draft.budget = if BUDGET_SKIP_WORDS.iter().any(|w| normalized == *w) {
                BudgetAnswer::Skipped
            } else {
                BudgetAnswer::Given(validate_text(field, answer)?)
            };
        }
    }

    draft.push_event(
        format!("lead.{}_set", field.as_str()),
        LeadStatus::Draft,
        LeadStatus::Draft,
        json!({ "field": field.as_str() }),
    );
    debug!(draft_id = %draft.id, field = field.as_str(), "lead answer recorded");

    match next_lead_question(draft) {
        Some(next) => Ok(LeadProgress::NextQuestion(next)),
        None => {
            finalize(draft)?;
            Ok(LeadProgress::Created { id: draft.id })
        }
    }
}

/// `draft -> new`, appending the terminal created event.
fn finalize(draft: &mut LeadDraft) -> Result<()> {
    ensure_open(draft)?;
    draft.status = LeadStatus::New;
    draft.push_event(
        "lead.created",
        LeadStatus::Draft,
        LeadStatus::New,
        json!({ "lead_id": draft.id }),
    );
    info!(draft_id = %draft.id, "lead created");
    Ok(())
}

/// `draft -> cancelled`, bypassing any remaining questions.
pub fn cancel(draft: &mut LeadDraft) -> Result<()> {
    ensure_open(draft)?;
    draft.status = LeadStatus::Cancelled;
    draft.push_event(
        "lead.cancelled",
        LeadStatus::Draft,
        LeadStatus::Cancelled,
        serde_json::Value::Null,
    );
    info!(draft_id = %draft.id, "lead cancelled");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_form_reaches_created() {
        let mut draft = LeadDraft::new("anon:a");

        let p = apply_answer(&mut draft, LeadField::RequestedService, "podcast editing").unwrap();
        assert_eq!(p, LeadProgress::NextQuestion(LeadField::Platform));

        apply_answer(&mut draft, LeadField::Platform, "spotify").unwrap();
        apply_answer(&mut draft, LeadField::Country, "UK").unwrap();
        apply_answer(&mut draft, LeadField::Urgency, "no rush").unwrap();

        let p = apply_answer(&mut draft, LeadField::Budget, "skip").unwrap();
        assert_eq!(p, LeadProgress::Created { id: draft.id });
        assert_eq!(draft.status, LeadStatus::New);
        assert_eq!(draft.budget, BudgetAnswer::Skipped);

        // Terminal created event is last.
        assert_eq!(draft.events.last().unwrap().event, "lead.created");
    }

    #[test]
    fn test_cancel_midway_bypasses_remaining_fields() {
        let mut draft = LeadDraft::new("anon:a");
        apply_answer(&mut draft, LeadField::RequestedService, "app development").unwrap();
        apply_answer(&mut draft, LeadField::Platform, "android").unwrap();

        // country and urgency still unset
        let p = apply_answer(&mut draft, LeadField::Country, "cancel").unwrap();
        assert_eq!(p, LeadProgress::Cancelled);
        assert_eq!(draft.status, LeadStatus::Cancelled);
        assert!(draft.country.is_none());
        assert_eq!(draft.events.last().unwrap().event, "lead.cancelled");
    }

    #[test]
    fn test_invalid_answer_leaves_draft_unchanged() {
        let mut draft = LeadDraft::new("anon:a");
        apply_answer(&mut draft, LeadField::RequestedService, "logo").unwrap();

        let err = apply_answer(&mut draft, LeadField::Urgency, "purple").unwrap_err();
        assert!(matches!(err, LeadError::Validation { .. }));
        assert!(draft.urgency.is_none());
        assert_eq!(draft.status, LeadStatus::Draft);
    }

    #[test]
    fn test_closed_draft_rejects_answers() {
        let mut draft = LeadDraft::new("anon:a");
        cancel(&mut draft).unwrap();

        let err = apply_answer(&mut draft, LeadField::Platform, "web").unwrap_err();
        assert!(matches!(err, LeadError::AlreadyClosed { .. }));
    }

    #[test]
    fn test_empty_answer_rejected() {
        let mut draft = LeadDraft::new("anon:a");
        let err = apply_answer(&mut draft, LeadField::RequestedService, "   ").unwrap_err();
        assert!(matches!(err, LeadError::Validation { .. }));
    }

    #[test]
    fn test_given_budget_recorded() {
        let mut draft = LeadDraft::with_requested_service("anon:a", "seo");
        draft.platform = Some("web".into());
        draft.country = Some("US".into());
        draft.urgency = Some(Urgency::High);

        let p = apply_answer(&mut draft, LeadField::Budget, "around $500").unwrap();
        assert_eq!(p, LeadProgress::Created { id: draft.id });
        assert_eq!(draft.budget, BudgetAnswer::Given("around $500".into()));
    }
}
