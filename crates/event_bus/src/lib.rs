//! event_bus - Named async pub/sub
//!
//! The bus decouples lifecycle transitions from their side effects
//! (notifications, commission accounting, cache invalidation). Handlers run
//! after the primary mutation has been persisted and can never delay, fail
//! or roll back the publishing call: each handler is spawned onto the
//! runtime and a failing handler is logged, not re-thrown.
//!
//! The bus is an owned instance passed around by `Arc`, never a
//! process-global.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::warn;

/// Event name carried by every transition publish alongside the
/// per-edge `"{kind}.{state}"` name.
pub const TRANSITION_EVENT: &str = "transition";

/// Payload delivered to handlers. Published values are serialized once by
/// the producer; handlers receive a clone.
pub type EventPayload = serde_json::Value;

/// Error returned by a subscribed handler. Logged by the bus, never
/// propagated to the publisher.
#[derive(Error, Debug)]
#[error("hook failed: {0}")]
pub struct HookError(pub String);

impl HookError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

type BoxedHandler =
    Arc<dyn Fn(EventPayload) -> BoxFuture<'static, Result<(), HookError>> + Send + Sync>;

struct Registration {
    handler: BoxedHandler,
    once: bool,
}

/// Named async pub/sub with at-most-once delivery per publish.
///
/// No ordering guarantee across handlers, no retry.
#[derive(Default)]
pub struct EventBus {
    handlers: RwLock<HashMap<String, Vec<Registration>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for every future publish of `event`.
    pub async fn on<F, Fut>(&self, event: &str, handler: F)
    where
        F: Fn(EventPayload) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HookError>> + Send + 'static,
    {
        self.register(event, handler, false).await;
    }

    /// Register a handler that is dropped after its first delivery.
    pub async fn once<F, Fut>(&self, event: &str, handler: F)
    where
        F: Fn(EventPayload) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HookError>> + Send + 'static,
    {
        self.register(event, handler, true).await;
    }

    async fn register<F, Fut>(&self, event: &str, handler: F, once: bool)
    where
        F: Fn(EventPayload) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HookError>> + Send + 'static,
    {
        let boxed: BoxedHandler = Arc::new(
            move |payload| -> BoxFuture<'static, Result<(), HookError>> {
                Box::pin(handler(payload))
            },
        );
        let mut handlers = self.handlers.write().await;
        handlers
            .entry(event.to_string())
            .or_default()
            .push(Registration {
                handler: boxed,
                once,
            });
    }

    /// Deliver `payload` to every handler registered for `event`.
    ///
    /// Handlers are spawned fire-and-forget: this call returns once the
    /// spawn is scheduled, and a rejected handler is logged without
    /// affecting siblings or the publisher.
    pub async fn publish(&self, event: &str, payload: EventPayload) {
        let batch: Vec<BoxedHandler> = {
            let mut handlers = self.handlers.write().await;
            match handlers.get_mut(event) {
                Some(registrations) => {
                    let batch = registrations
                        .iter()
                        .map(|r| Arc::clone(&r.handler))
                        .collect();
                    registrations.retain(|r| !r.once);
                    batch
                }
                None => Vec::new(),
            }
        };

        for handler in batch {
            let payload = payload.clone();
            let event = event.to_string();
            tokio::spawn(async move {
                if let Err(err) = handler(payload).await {
                    warn!(event = %event, error = %err, "event handler failed");
                }
            });
        }
    }

    /// Number of live registrations for `event`.
    pub async fn handler_count(&self, event: &str) -> usize {
        self.handlers
            .read()
            .await
            .get(event)
            .map(|v| v.len())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::{sleep, Duration};

    #[tokio::test]
    async fn test_publish_reaches_all_handlers() {
        let bus = EventBus::new();
        let hits = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let hits = Arc::clone(&hits);
            bus.on("order.in_progress", move |_| {
                let hits = Arc::clone(&hits);
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            })
            .await;
        }

        bus.publish("order.in_progress", serde_json::json!({})).await;
        sleep(Duration::from_millis(50)).await;

        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_failing_handler_does_not_affect_siblings() {
        let bus = EventBus::new();
        let hits = Arc::new(AtomicUsize::new(0));

        bus.on("transition", |_| async {
            Err(HookError::new("notification service down"))
        })
        .await;

        let sibling_hits = Arc::clone(&hits);
        bus.on("transition", move |_| {
            let hits = Arc::clone(&sibling_hits);
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        })
        .await;

        bus.publish("transition", serde_json::json!({})).await;
        sleep(Duration::from_millis(50)).await;

        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_once_fires_at_most_once() {
        let bus = EventBus::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let once_hits = Arc::clone(&hits);
        bus.once("rental.expired", move |_| {
            let hits = Arc::clone(&once_hits);
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        })
        .await;

        bus.publish("rental.expired", serde_json::json!({})).await;
        bus.publish("rental.expired", serde_json::json!({})).await;
        sleep(Duration::from_millis(50)).await;

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(bus.handler_count("rental.expired").await, 0);
    }

    #[tokio::test]
    async fn test_publish_without_handlers_is_a_no_op() {
        let bus = EventBus::new();
        bus.publish("ticket.closed", serde_json::json!({ "id": 1 }))
            .await;
        assert_eq!(bus.handler_count("ticket.closed").await, 0);
    }

    #[tokio::test]
    async fn test_handler_receives_payload() {
        let bus = EventBus::new();
        let (tx, rx) = tokio::sync::oneshot::channel::<EventPayload>();
        let tx = Arc::new(tokio::sync::Mutex::new(Some(tx)));

        bus.once("transition", move |payload| {
            let tx = Arc::clone(&tx);
            async move {
                if let Some(tx) = tx.lock().await.take() {
                    let _ = tx.send(payload);
                }
                Ok(())
            }
        })
        .await;

        bus.publish(
            "transition",
            serde_json::json!({ "next_state": "in_progress" }),
        )
        .await;

        let payload = rx.await.unwrap();
        assert_eq!(payload["next_state"], "in_progress");
    }
}
