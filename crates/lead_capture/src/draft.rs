//! Lead draft
//!
//! The draft's status lives in the same kind of graph as the marketplace
//! entities: `draft -> new | cancelled`, both targets terminal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use dialog_core::FlowStep;
use lifecycle_core::{AuditEntry, EntityState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    Draft,
    New,
    Cancelled,
}

impl EntityState for LeadStatus {
    const ALL: &'static [Self] = &[Self::Draft, Self::New, Self::Cancelled];

    fn allowed_next(self) -> &'static [Self] {
        match self {
            Self::Draft => &[Self::New, Self::Cancelled],
            Self::New => &[],
            Self::Cancelled => &[],
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::New => "new",
            Self::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Low,
    Normal,
    High,
    Urgent,
}

impl Urgency {
    /// Lenient keyword parse of a free-text urgency answer.
    pub fn parse(text: &str) -> Option<Self> {
        let normalized = text.trim().to_lowercase();
        if ["urgent", "asap", "immediately", "right now"]
            .iter()
            .any(|w| normalized.contains(w))
        {
            return Some(Self::Urgent);
        }
        if ["soon", "this week", "high"].iter().any(|w| normalized.contains(w)) {
            return Some(Self::High);
        }
        if ["no rush", "whenever", "low", "no hurry"]
            .iter()
            .any(|w| normalized.contains(w))
        {
            return Some(Self::Low);
        }
        if ["normal", "standard", "flexible", "next month"]
            .iter()
            .any(|w| normalized.contains(w))
        {
            return Some(Self::Normal);
        }
        None
    }
}

/// The optional budget field, distinguishing "not yet asked" from an
/// explicit skip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum BudgetAnswer {
    #[default]
    NotAsked,
    Skipped,
    Given(String),
}

impl BudgetAnswer {
    pub fn is_resolved(&self) -> bool {
        !matches!(self, Self::NotAsked)
    }
}

/// The fields the form collects, in asking order. Budget is the only
/// optional one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadField {
    RequestedService,
    Platform,
    Country,
    Urgency,
    Budget,
}

impl LeadField {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RequestedService => "requested_service",
            Self::Platform => "platform",
            Self::Country => "country",
            Self::Urgency => "urgency",
            Self::Budget => "budget",
        }
    }

    /// The dialogue step that asks this field.
    pub const fn step(self) -> FlowStep {
        match self {
            Self::RequestedService => FlowStep::AskLeadService,
            Self::Platform => FlowStep::AskLeadPlatform,
            Self::Country => FlowStep::AskLeadCountry,
            Self::Urgency => FlowStep::AskLeadUrgency,
            Self::Budget => FlowStep::AskLeadBudget,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadDraft {
    pub id: Uuid,
    /// Session identity the lead came from.
    pub identity_key: String,
    pub requested_service: Option<String>,
    pub platform: Option<String>,
    pub country: Option<String>,
    pub urgency: Option<Urgency>,
    #[serde(default)]
    pub budget: BudgetAnswer,
    pub status: LeadStatus,
    pub created_at: DateTime<Utc>,
    /// Append-only, same shape as the entity audit trail.
    #[serde(default)]
    pub events: Vec<AuditEntry<LeadStatus>>,
}

impl LeadDraft {
    pub fn new(identity_key: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            identity_key: identity_key.into(),
            requested_service: None,
            platform: None,
            country: None,
            urgency: None,
            budget: BudgetAnswer::NotAsked,
            status: LeadStatus::Draft,
            created_at: Utc::now(),
            events: Vec::new(),
        }
    }

    /// A draft seeded with the service description that triggered it.
    pub fn with_requested_service(identity_key: impl Into<String>, service: impl Into<String>) -> Self {
        let mut draft = Self::new(identity_key);
        draft.requested_service = Some(service.into());
        draft
    }

    pub(crate) fn push_event(
        &mut self,
        event: impl Into<String>,
        from: LeadStatus,
        to: LeadStatus,
        meta: serde_json::Value,
    ) {
        self.events.push(AuditEntry {
            event: event.into(),
            from,
            to,
            at: Utc::now(),
            actor: self.identity_key.clone(),
            reason: None,
            meta,
        });
    }
}

/// The first unset required field, then budget if not yet asked.
pub fn next_lead_question(draft: &LeadDraft) -> Option<LeadField> {
    if draft.requested_service.is_none() {
        return Some(LeadField::RequestedService);
    }
    if draft.platform.is_none() {
        return Some(LeadField::Platform);
    }
    if draft.country.is_none() {
        return Some(LeadField::Country);
    }
    if draft.urgency.is_none() {
        return Some(LeadField::Urgency);
    }
    if !draft.budget.is_resolved() {
        return Some(LeadField::Budget);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_order_skips_prefilled() {
        let draft = LeadDraft::with_requested_service("anon:a", "video editing");
        assert_eq!(next_lead_question(&draft), Some(LeadField::Platform));
    }

    #[test]
    fn test_budget_asked_last_and_only_once() {
        let mut draft = LeadDraft::new("anon:a");
        draft.requested_service = Some("seo audit".into());
        draft.platform = Some("web".into());
        draft.country = Some("Germany".into());
        draft.urgency = Some(Urgency::Normal);
        assert_eq!(next_lead_question(&draft), Some(LeadField::Budget));

        draft.budget = BudgetAnswer::Skipped;
        assert_eq!(next_lead_question(&draft), None);
    }

    #[test]
    fn test_draft_status_graph() {
        assert!(LeadStatus::Draft.can_transition_to(LeadStatus::New));
        assert!(LeadStatus::Draft.can_transition_to(LeadStatus::Cancelled));
        assert!(LeadStatus::New.is_terminal());
        assert!(LeadStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_urgency_parse() {
        assert_eq!(Urgency::parse("ASAP please"), Some(Urgency::Urgent));
        assert_eq!(Urgency::parse("sometime soon"), Some(Urgency::High));
        assert_eq!(Urgency::parse("no rush at all"), Some(Urgency::Low));
        assert_eq!(Urgency::parse("xyz"), None);
    }
}
