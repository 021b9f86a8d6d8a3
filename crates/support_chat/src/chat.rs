//! Chat turn orchestration
//!
//! One `chat()` call per inbound message: resolve identity, open the
//! session, route the message, commit the session with a refreshed TTL.
//! Every internal failure degrades to a deterministic fallback reply.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use dialog_core::{DialogSession, FlowData, FlowKind, FlowStep, Sender};
use dialog_router::{
    advance_flow, has_active_flow, is_confused, prompt_for, question_for, quick_reply_route,
    IntentClassifier, IntentTag, Prompt, RouteTarget, RouterError,
};
use event_bus::EventBus;
use lead_capture::{
    apply_answer, next_lead_question, LeadDraft, LeadError, LeadField, LeadProgress, LeadStore,
};
use session_store::{Identity, SessionError, SessionStorage, SessionStore};

use crate::provider::ReplyModel;
use crate::replies::{
    interview_booked_reply, lead_created_reply, order_placed_reply, order_status_reply,
    FALLBACK_TEXT, FLOW_CANCELLED, LEAD_CANCELLED, MENU_QUICK_REPLIES, MENU_TEXT,
    NOTHING_TO_CANCEL, SMALLTALK_FALLBACK,
};

/// Services the chat can sell directly; anything else becomes a lead.
const CATALOG_SERVICES: &[&str] = &[
    "logo design",
    "seo audit",
    "web development",
    "video editing",
    "cv review",
];

const LEAD_INTRO: &str =
    "I couldn't find an exact match in our catalog, but I can pass your request to our team.";

const DIDNT_CATCH: &str = "Sorry, I didn't catch that. Could you type it again?";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anon_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionMeta {
    pub identity_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow: Option<FlowKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<FlowStep>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    /// Fresh anonymous token for the cookie layer, when one was minted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issued_token: Option<String>,
}

impl SessionMeta {
    fn of(session: &DialogSession, identity: &Identity) -> Self {
        Self {
            identity_key: session.identity_key.clone(),
            flow: session.flow,
            step: session.step,
            expires_at: Some(session.expires_at),
            issued_token: identity.issued_token.clone(),
        }
    }

    fn degraded(identity: &Identity) -> Self {
        Self {
            identity_key: identity.key.clone(),
            flow: None,
            step: None,
            expires_at: None,
            issued_token: identity.issued_token.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
    pub quick_replies: Vec<String>,
    pub intent: IntentTag,
    pub session: SessionMeta,
}

/// Internal failure union; fully absorbed by `chat()`.
#[derive(Error, Debug)]
enum ChatError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Lead(#[from] LeadError),
    #[error(transparent)]
    Router(#[from] RouterError),
}

type TurnOutput = (String, Vec<String>, IntentTag);

pub struct SupportChat<S: SessionStorage, L: LeadStore> {
    sessions: SessionStore<S>,
    leads: Arc<L>,
    classifier: Arc<dyn IntentClassifier>,
    model: Option<Arc<dyn ReplyModel>>,
    bus: Arc<EventBus>,
}

impl<S: SessionStorage, L: LeadStore> SupportChat<S, L> {
    pub fn new(
        sessions: SessionStore<S>,
        leads: Arc<L>,
        classifier: Arc<dyn IntentClassifier>,
        bus: Arc<EventBus>,
    ) -> Self {
        Self {
            sessions,
            leads,
            classifier,
            model: None,
            bus,
        }
    }

    /// Attach an optional LLM-backed smalltalk provider.
    pub fn with_model(mut self, model: Arc<dyn ReplyModel>) -> Self {
        self.model = Some(model);
        self
    }

    /// Handle one inbound message. Never returns a hard error: any internal
    /// failure is logged and mapped to a fallback reply.
    pub async fn chat(&self, request: ChatRequest) -> ChatReply {
        let identity = Identity::resolve(
            request.auth_user_id.as_deref(),
            request.anon_token.as_deref(),
        );

        match self.turn(&identity, &request.message).await {
            Ok(reply) => reply,
            Err(err) => {
                error!(key = %identity.key, error = %err, "chat turn failed, degrading");
                ChatReply {
                    reply: FALLBACK_TEXT.to_string(),
                    quick_replies: menu_quick_replies(),
                    intent: IntentTag::Unknown,
                    session: SessionMeta::degraded(&identity),
                }
            }
        }
    }

    async fn turn(&self, identity: &Identity, message: &str) -> Result<ChatReply, ChatError> {
        let mut session = self.sessions.open(identity).await?;
        session.record(Sender::User, message);

        let (reply, quick_replies, intent) = self.respond(&mut session, message).await?;

        session.record(Sender::Assistant, reply.as_str());
        self.sessions.commit(&mut session).await?;

        Ok(ChatReply {
            reply,
            quick_replies,
            intent,
            session: SessionMeta::of(&session, identity),
        })
    }

    async fn respond(
        &self,
        session: &mut DialogSession,
        message: &str,
    ) -> Result<TurnOutput, ChatError> {
        let intent = self.classifier.classify(message);

        if message.trim().is_empty() {
            let quick = if has_active_flow(session) {
                session.step.map(flow_quick_replies).unwrap_or_else(menu_quick_replies)
            } else {
                menu_quick_replies()
            };
            return Ok((DIDNT_CATCH.to_string(), quick, intent));
        }

        if has_active_flow(session) {
            // A repeated question may only go out rephrased, and only after
            // a confusion signal.
            if let Some(step) = session.step {
                if is_confused(message) {
                    if let Some(question) = question_for(step) {
                        if session.was_asked(question.key) {
                            return Ok((
                                question.rephrased.to_string(),
                                flow_quick_replies(step),
                                intent,
                            ));
                        }
                    }
                }
            }

            return match session.flow {
                Some(FlowKind::LeadCapture) => self.continue_lead(session, message, intent).await,
                Some(_) => self.continue_simple(session, message, intent),
                None => Ok(menu_turn(intent)),
            };
        }

        // No active flow: quick-reply routes win over classification.
        if let Some(route) = quick_reply_route(message) {
            return Ok(enter_route(session, route, message, intent));
        }

        match intent {
            IntentTag::BuyService => Ok(enter_flow_at(
                session,
                FlowKind::BuyService,
                FlowStep::AskService,
                message,
                intent,
            )),
            IntentTag::OrderStatus => Ok(enter_flow_at(
                session,
                FlowKind::OrderStatus,
                FlowStep::AskOrderRef,
                message,
                intent,
            )),
            IntentTag::InterviewHelp => Ok(enter_flow_at(
                session,
                FlowKind::InterviewHelp,
                FlowStep::AskTopic,
                message,
                intent,
            )),
            IntentTag::ServiceRequest => self.open_service_request(session, message, intent).await,
            IntentTag::Cancel => Ok((NOTHING_TO_CANCEL.to_string(), menu_quick_replies(), intent)),
            IntentTag::Smalltalk => Ok(self.smalltalk(session).await),
            IntentTag::Greeting | IntentTag::Unknown => Ok(menu_turn(intent)),
        }
    }

    /// Service request with a catalog match starts a purchase; anything
    /// else opens a lead draft.
    async fn open_service_request(
        &self,
        session: &mut DialogSession,
        message: &str,
        intent: IntentTag,
    ) -> Result<TurnOutput, ChatError> {
        if let Some(service) = catalog_match(message) {
            session.enter_flow(
                FlowKind::BuyService,
                FlowStep::AskService,
                FlowData::BuyService {
                    service: Some(service.to_string()),
                    budget: None,
                    confirmed: None,
                },
            );
            let advance = advance_flow(FlowKind::BuyService, FlowStep::AskService, &session.data)?;
            let text = ask(session, advance.next, message);
            return Ok((text, flow_quick_replies(advance.next), intent));
        }

        let draft = LeadDraft::with_requested_service(session.identity_key.as_str(), message.trim());
        let next = next_lead_question(&draft).unwrap_or(LeadField::Platform);
        self.leads.save(&draft).await?;

        session.enter_flow(
            FlowKind::LeadCapture,
            next.step(),
            FlowData::LeadCapture { draft_id: draft.id },
        );
        let question = ask(session, next.step(), message);
        Ok((
            format!("{LEAD_INTRO} {question}"),
            flow_quick_replies(next.step()),
            intent,
        ))
    }

    async fn continue_lead(
        &self,
        session: &mut DialogSession,
        message: &str,
        intent: IntentTag,
    ) -> Result<TurnOutput, ChatError> {
        let draft_id = match session.data {
            FlowData::LeadCapture { draft_id } => draft_id,
            _ => {
                warn!(key = %session.identity_key, "lead flow without a draft reference");
                session.clear_flow();
                return Ok(menu_turn(intent));
            }
        };

        let Some(mut draft) = self.leads.find_by_id(draft_id).await? else {
            warn!(key = %session.identity_key, draft_id = %draft_id, "lead draft vanished");
            session.clear_flow();
            return Ok(menu_turn(intent));
        };

        let step = session.step.unwrap_or(FlowStep::AskLeadService);
        let Some(field) = lead_field_for(step) else {
            session.clear_flow();
            return Ok(menu_turn(intent));
        };

        match apply_answer(&mut draft, field, message) {
            Ok(LeadProgress::NextQuestion(next)) => {
                self.leads.save(&draft).await?;
                let text = ask(session, next.step(), message);
                Ok((text, flow_quick_replies(next.step()), intent))
            }
            Ok(LeadProgress::Created { id }) => {
                self.leads.save(&draft).await?;
                session.step = Some(FlowStep::Complete);
                self.bus
                    .publish(
                        "lead.created",
                        json!({ "lead_id": id, "identity_key": session.identity_key }),
                    )
                    .await;
                Ok((lead_created_reply(id), menu_quick_replies(), intent))
            }
            Ok(LeadProgress::Cancelled) => {
                self.leads.save(&draft).await?;
                session.step = Some(FlowStep::Cancelled);
                Ok((LEAD_CANCELLED.to_string(), menu_quick_replies(), intent))
            }
            Err(LeadError::Validation { message: why, .. }) => {
                let hint = question_for(step).map(|q| q.rephrased).unwrap_or_default();
                Ok((
                    format!("Hmm, {why}. {hint}"),
                    flow_quick_replies(step),
                    intent,
                ))
            }
            Err(other) => Err(other.into()),
        }
    }

    fn continue_simple(
        &self,
        session: &mut DialogSession,
        message: &str,
        intent: IntentTag,
    ) -> Result<TurnOutput, ChatError> {
        let (Some(flow), Some(step)) = (session.flow, session.step) else {
            return Ok(menu_turn(intent));
        };

        if intent == IntentTag::Cancel {
            session.step = Some(FlowStep::Cancelled);
            return Ok((FLOW_CANCELLED.to_string(), menu_quick_replies(), intent));
        }

        let answer = message.trim().to_string();

        match (flow, step) {
            (FlowKind::BuyService, FlowStep::AskService) => {
                if let FlowData::BuyService { service, .. } = &mut session.data {
                    *service = Some(answer);
                }
                let advance = advance_flow(flow, step, &session.data)?;
                let text = ask(session, advance.next, message);
                Ok((text, flow_quick_replies(advance.next), intent))
            }
            (FlowKind::BuyService, FlowStep::AskBudget) => {
                if let FlowData::BuyService { budget, .. } = &mut session.data {
                    *budget = Some(answer);
                }
                let advance = advance_flow(flow, step, &session.data)?;
                let text = ask(session, advance.next, message);
                Ok((text, flow_quick_replies(advance.next), intent))
            }
            (FlowKind::BuyService, FlowStep::ConfirmPurchase) => {
                let accepted = is_affirmative(message);
                if let FlowData::BuyService { confirmed, .. } = &mut session.data {
                    *confirmed = Some(accepted);
                }
                if accepted {
                    session.step = Some(FlowStep::Complete);
                    let service = match &session.data {
                        FlowData::BuyService {
                            service: Some(s), ..
                        } => s.clone(),
                        _ => "your service".to_string(),
                    };
                    Ok((order_placed_reply(&service), menu_quick_replies(), intent))
                } else {
                    session.step = Some(FlowStep::Cancelled);
                    Ok((FLOW_CANCELLED.to_string(), menu_quick_replies(), intent))
                }
            }
            (FlowKind::OrderStatus, FlowStep::AskOrderRef) => {
                if let FlowData::OrderStatus { order_ref } = &mut session.data {
                    *order_ref = Some(answer.clone());
                }
                session.step = Some(FlowStep::Complete);
                Ok((order_status_reply(&answer), menu_quick_replies(), intent))
            }
            (FlowKind::InterviewHelp, FlowStep::AskTopic) => {
                if let FlowData::InterviewHelp { topic, .. } = &mut session.data {
                    *topic = Some(answer);
                }
                let advance = advance_flow(flow, step, &session.data)?;
                if advance.complete {
                    session.step = Some(FlowStep::Complete);
                    let topic = interview_topic(&session.data);
                    Ok((interview_booked_reply(&topic), menu_quick_replies(), intent))
                } else {
                    let text = ask(session, advance.next, message);
                    Ok((text, flow_quick_replies(advance.next), intent))
                }
            }
            (FlowKind::InterviewHelp, FlowStep::AskSchedule) => {
                if let FlowData::InterviewHelp { schedule, .. } = &mut session.data {
                    *schedule = Some(answer);
                }
                session.step = Some(FlowStep::Complete);
                let topic = interview_topic(&session.data);
                Ok((interview_booked_reply(&topic), menu_quick_replies(), intent))
            }
            _ => {
                warn!(?flow, ?step, "unexpected flow position, resetting");
                session.clear_flow();
                Ok(menu_turn(intent))
            }
        }
    }

    async fn smalltalk(&self, session: &DialogSession) -> TurnOutput {
        if let Some(model) = &self.model {
            match model.complete(&session.history.recent(10)).await {
                Ok(text) if !text.trim().is_empty() => {
                    return (text, menu_quick_replies(), IntentTag::Smalltalk)
                }
                Ok(_) => warn!("provider returned an empty reply, using fallback"),
                Err(err) => warn!(error = %err, "provider failed, using fallback"),
            }
        }
        (
            SMALLTALK_FALLBACK.to_string(),
            menu_quick_replies(),
            IntentTag::Smalltalk,
        )
    }
}

fn menu_quick_replies() -> Vec<String> {
    MENU_QUICK_REPLIES.iter().map(|s| s.to_string()).collect()
}

fn menu_turn(intent: IntentTag) -> TurnOutput {
    (MENU_TEXT.to_string(), menu_quick_replies(), intent)
}

fn flow_quick_replies(step: FlowStep) -> Vec<String> {
    match step {
        FlowStep::AskLeadBudget => vec!["Skip".to_string(), "Cancel".to_string()],
        FlowStep::ConfirmPurchase => vec!["Yes".to_string(), "No".to_string()],
        _ => vec!["Cancel".to_string()],
    }
}

/// Position the session on `step` and resolve its prompt with the
/// anti-repeat guard applied.
fn ask(session: &mut DialogSession, step: FlowStep, incoming: &str) -> String {
    session.step = Some(step);
    match prompt_for(session, step, incoming) {
        Some(Prompt::First(text)) | Some(Prompt::Rephrased(text)) => text.to_string(),
        Some(Prompt::Suppressed) => question_for(step)
            .map(|q| q.rephrased.to_string())
            .unwrap_or_else(|| MENU_TEXT.to_string()),
        None => MENU_TEXT.to_string(),
    }
}

fn enter_route(
    session: &mut DialogSession,
    route: RouteTarget,
    message: &str,
    intent: IntentTag,
) -> TurnOutput {
    enter_flow_at(session, route.flow, route.step, message, intent)
}

fn enter_flow_at(
    session: &mut DialogSession,
    flow: FlowKind,
    step: FlowStep,
    message: &str,
    intent: IntentTag,
) -> TurnOutput {
    session.enter_flow(flow, step, FlowData::empty(flow));
    let text = ask(session, step, message);
    (text, flow_quick_replies(step), intent)
}

fn lead_field_for(step: FlowStep) -> Option<LeadField> {
    match step {
        FlowStep::AskLeadService => Some(LeadField::RequestedService),
        FlowStep::AskLeadPlatform => Some(LeadField::Platform),
        FlowStep::AskLeadCountry => Some(LeadField::Country),
        FlowStep::AskLeadUrgency => Some(LeadField::Urgency),
        FlowStep::AskLeadBudget => Some(LeadField::Budget),
        _ => None,
    }
}

fn catalog_match(text: &str) -> Option<&'static str> {
    let normalized = text.trim().to_lowercase();
    CATALOG_SERVICES
        .iter()
        .find(|s| normalized.contains(*s))
        .copied()
}

fn is_affirmative(text: &str) -> bool {
    let normalized = text.trim().to_lowercase();
    ["yes", "yep", "yeah", "sure", "ok", "okay", "y", "confirm"]
        .iter()
        .any(|w| normalized == *w || normalized.starts_with(&format!("{w} ")))
}

fn interview_topic(data: &FlowData) -> String {
    match data {
        FlowData::InterviewHelp {
            topic: Some(t), ..
        } => t.clone(),
        _ => "your".to_string(),
    }
}
