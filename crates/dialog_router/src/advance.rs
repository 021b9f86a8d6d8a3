//! Step graphs
//!
//! The dialogue analogue of the entity state graphs: a pure function of
//! (flow, step, collected data) that yields the next step. Steps are
//! totally ordered within a flow except where an answer is already known
//! (skip-if-present).

use dialog_core::{DialogSession, FlowData, FlowKind, FlowStep};

use crate::error::RouterError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepAdvance {
    pub next: FlowStep,
    pub complete: bool,
}

impl StepAdvance {
    fn to(next: FlowStep) -> Self {
        Self {
            next,
            complete: next.is_terminal(),
        }
    }
}

/// Compute the step following `step` in `flow`, given what is already
/// collected.
///
/// A (flow, step) pair outside the graph is a configuration error, never
/// an implicit pass-through.
pub fn advance_flow(
    flow: FlowKind,
    step: FlowStep,
    data: &FlowData,
) -> Result<StepAdvance, RouterError> {
    let next = match (flow, step) {
        // Buy service
        (FlowKind::BuyService, FlowStep::AskService) => match data {
            FlowData::BuyService {
                budget: Some(_), ..
            } => StepAdvance::to(FlowStep::ConfirmPurchase),
            _ => StepAdvance::to(FlowStep::AskBudget),
        },
        (FlowKind::BuyService, FlowStep::AskBudget) => StepAdvance::to(FlowStep::ConfirmPurchase),
        (FlowKind::BuyService, FlowStep::ConfirmPurchase) => StepAdvance::to(FlowStep::Complete),

        // Order status
        (FlowKind::OrderStatus, FlowStep::AskOrderRef) => StepAdvance::to(FlowStep::Complete),

        // Interview help
        (FlowKind::InterviewHelp, FlowStep::AskTopic) => match data {
            FlowData::InterviewHelp {
                schedule: Some(_), ..
            } => StepAdvance::to(FlowStep::Complete),
            _ => StepAdvance::to(FlowStep::AskSchedule),
        },
        (FlowKind::InterviewHelp, FlowStep::AskSchedule) => StepAdvance::to(FlowStep::Complete),

        // Lead capture: the nominal order; the lead engine skips already
        // filled fields by choosing the entry step itself.
        (FlowKind::LeadCapture, FlowStep::AskLeadService) => {
            StepAdvance::to(FlowStep::AskLeadPlatform)
        }
        (FlowKind::LeadCapture, FlowStep::AskLeadPlatform) => {
            StepAdvance::to(FlowStep::AskLeadCountry)
        }
        (FlowKind::LeadCapture, FlowStep::AskLeadCountry) => {
            StepAdvance::to(FlowStep::AskLeadUrgency)
        }
        (FlowKind::LeadCapture, FlowStep::AskLeadUrgency) => {
            StepAdvance::to(FlowStep::AskLeadBudget)
        }
        (FlowKind::LeadCapture, FlowStep::AskLeadBudget) => StepAdvance::to(FlowStep::Complete),

        // Terminal steps stay put.
        (_, FlowStep::Complete) => StepAdvance::to(FlowStep::Complete),
        (_, FlowStep::Cancelled) => StepAdvance::to(FlowStep::Cancelled),
        (_, FlowStep::Done) => StepAdvance::to(FlowStep::Done),

        (flow, step) => return Err(RouterError::Config { flow, step }),
    };
    Ok(next)
}

/// True iff a flow is genuinely in progress.
///
/// This predicate gates every "reset to greeting/menu" heuristic: a flow
/// in progress is never abandoned because the user typed something that
/// superficially looks like a greeting.
pub fn has_active_flow(session: &DialogSession) -> bool {
    matches!(
        (session.flow, session.step),
        (Some(_), Some(step)) if !step.is_terminal()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_buy_service_ordered_steps() {
        let data = FlowData::empty(FlowKind::BuyService);
        let adv = advance_flow(FlowKind::BuyService, FlowStep::AskService, &data).unwrap();
        assert_eq!(adv.next, FlowStep::AskBudget);
        assert!(!adv.complete);

        let adv = advance_flow(FlowKind::BuyService, FlowStep::ConfirmPurchase, &data).unwrap();
        assert_eq!(adv.next, FlowStep::Complete);
        assert!(adv.complete);
    }

    #[test]
    fn test_skip_if_budget_already_known() {
        let data = FlowData::BuyService {
            service: None,
            budget: Some("100".into()),
            confirmed: None,
        };
        let adv = advance_flow(FlowKind::BuyService, FlowStep::AskService, &data).unwrap();
        assert_eq!(adv.next, FlowStep::ConfirmPurchase);
    }

    #[test]
    fn test_mismatched_pair_is_config_error() {
        let data = FlowData::None;
        let err = advance_flow(FlowKind::OrderStatus, FlowStep::AskTopic, &data).unwrap_err();
        assert!(matches!(err, RouterError::Config { .. }));
    }

    #[test]
    fn test_active_flow_predicate() {
        let mut session = DialogSession::new("anon:a", false, Duration::minutes(30));
        assert!(!has_active_flow(&session));

        session.enter_flow(
            FlowKind::BuyService,
            FlowStep::AskService,
            FlowData::empty(FlowKind::BuyService),
        );
        assert!(has_active_flow(&session));

        session.step = Some(FlowStep::Complete);
        assert!(!has_active_flow(&session));
    }
}
