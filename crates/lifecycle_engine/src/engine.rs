//! Transition engine
//!
//! Validates one status change against the entity's state graph, appends
//! the audit trail, applies derived effects and persists, then publishes
//! post-commit events. Event delivery is fire-and-forget: the caller's
//! future resolves once persistence completes, not once subscribers finish.

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use event_bus::{EventBus, TRANSITION_EVENT};
use lifecycle_core::{
    AuditEntry, EntityState, Lifecycle, Result, TimelineEntry, TransitionError, TransitionMeta,
};

use crate::effects::DerivedEffects;
use crate::repository::EntityRepository;

/// Result of a pre-flight check. Pure read; nothing is written.
#[derive(Debug, Clone)]
pub struct TransitionCheck<S> {
    pub allowed: bool,
    pub current: S,
    pub allowed_next: Vec<S>,
    /// Set when `allowed` is false, phrased for UI display.
    pub reason: Option<String>,
}

/// Per-id outcome of a batch call.
#[derive(Debug)]
pub struct BatchOutcome<E> {
    pub id: Uuid,
    pub outcome: Result<E>,
}

impl<E> BatchOutcome<E> {
    pub fn success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Executes validated state changes for one entity type.
pub struct TransitionEngine<E: Lifecycle> {
    repo: Arc<dyn EntityRepository<E>>,
    effects: Arc<dyn DerivedEffects<E>>,
    bus: Arc<EventBus>,
}

impl<E: Lifecycle> TransitionEngine<E> {
    pub fn new(
        repo: Arc<dyn EntityRepository<E>>,
        effects: Arc<dyn DerivedEffects<E>>,
        bus: Arc<EventBus>,
    ) -> Self {
        Self { repo, effects, bus }
    }

    /// The full `state -> allowed next states` table for this entity type,
    /// for UI rendering of legal next actions.
    pub fn graph() -> Vec<(E::State, &'static [E::State])> {
        lifecycle_core::transition_table::<E::State>()
    }

    /// Apply one validated state change.
    ///
    /// On an illegal edge the entity is untouched and the error carries the
    /// allowed set. On success the status, one audit entry, one timeline
    /// entry and any derived fields persist as a single save, after which
    /// `"{kind}.{next}"` and the generic `"transition"` event are published.
    pub async fn transition(&self, id: Uuid, next: E::State, meta: TransitionMeta) -> Result<E> {
        let mut entity = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(TransitionError::NotFound(id))?;

        let from = entity.state();
        if !from.can_transition_to(next) {
            return Err(TransitionError::InvalidTransition {
                from: from.as_str().to_string(),
                to: next.as_str().to_string(),
                allowed: from
                    .allowed_next()
                    .iter()
                    .map(|s| s.as_str().to_string())
                    .collect(),
            });
        }

        let now = chrono::Utc::now();
        let event_name = format!("{}.{}", E::KIND.as_str(), next.as_str());

        entity.set_state(next);
        entity.push_audit(AuditEntry {
            event: event_name.clone(),
            from,
            to: next,
            at: now,
            actor: meta.actor.clone(),
            reason: meta.reason.clone(),
            meta: meta.data.clone(),
        });
        entity.push_timeline(TimelineEntry {
            at: now,
            actor: meta.actor.clone(),
            text: format!(
                "status changed from {} to {}",
                from.as_str(),
                next.as_str()
            ),
        });
        self.effects.apply(&mut entity, from, next, &meta);

        self.repo.save(&entity).await?;

        debug!(
            kind = E::KIND.as_str(),
            id = %id,
            from = from.as_str(),
            to = next.as_str(),
            actor = %meta.actor,
            "transition applied"
        );

        let payload = serde_json::json!({
            "kind": E::KIND.as_str(),
            "id": id,
            "previous_state": from.as_str(),
            "next_state": next.as_str(),
            "item": serde_json::to_value(&entity).unwrap_or(serde_json::Value::Null),
            "meta": serde_json::to_value(&meta).unwrap_or(serde_json::Value::Null),
        });
        self.bus.publish(&event_name, payload.clone()).await;
        self.bus.publish(TRANSITION_EVENT, payload).await;

        Ok(entity)
    }

    /// Pre-flight check used by UI layers. Performs zero writes.
    pub async fn can_transition(&self, id: Uuid, next: E::State) -> Result<TransitionCheck<E::State>> {
        let entity = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(TransitionError::NotFound(id))?;

        let current = entity.state();
        let allowed = current.can_transition_to(next);
        Ok(TransitionCheck {
            allowed,
            current,
            allowed_next: current.allowed_next().to_vec(),
            reason: (!allowed).then(|| {
                format!(
                    "cannot move from {} to {}",
                    current.as_str(),
                    next.as_str()
                )
            }),
        })
    }

    /// Apply `transition` independently per id. One failure does not abort
    /// the others; there is no atomicity across the batch.
    pub async fn batch_transition(
        &self,
        ids: &[Uuid],
        next: E::State,
        meta: TransitionMeta,
    ) -> Vec<BatchOutcome<E>> {
        let mut outcomes = Vec::with_capacity(ids.len());
        for &id in ids {
            let outcome = self.transition(id, next, meta.clone()).await;
            outcomes.push(BatchOutcome { id, outcome });
        }
        outcomes
    }

    /// Read-only status projection.
    pub async fn current_state(&self, id: Uuid) -> Result<Option<E::State>> {
        Ok(self.repo.find_by_id(id).await?.map(|e| e.state()))
    }
}
