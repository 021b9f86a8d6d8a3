//! Integration tests for the orchestration core
//!
//! The entity lifecycle engine and the support chat are the same pattern
//! applied to different state: both validate edges against a static graph,
//! persist, then publish on a shared event bus. These tests run the two
//! machines side by side on one bus instance.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::time::{sleep, Duration};

use dialog_router::KeywordClassifier;
use event_bus::{EventBus, HookError};
use lead_capture::MemoryLeadStore;
use lifecycle_core::{Order, OrderState, Rental, RentalState, TransitionMeta};
use lifecycle_engine::{
    EntityRepository, MemoryRepository, OrderEffects, RentalEffects, TransitionEngine,
};
use session_store::{MemorySessionStorage, SessionStore};
use support_chat::{ChatRequest, SupportChat};

fn chat_on(bus: Arc<EventBus>) -> SupportChat<MemorySessionStorage, MemoryLeadStore> {
    SupportChat::new(
        SessionStore::new(MemorySessionStorage::new()),
        Arc::new(MemoryLeadStore::new()),
        Arc::new(KeywordClassifier::new()),
        bus,
    )
}

fn request(message: &str) -> ChatRequest {
    ChatRequest {
        message: message.to_string(),
        auth_user_id: None,
        anon_token: Some("integration-token".to_string()),
    }
}

#[tokio::test]
async fn test_entity_and_dialogue_machines_share_one_bus() {
    let bus = Arc::new(EventBus::new());
    let notified = Arc::new(AtomicUsize::new(0));

    for event in ["order.in_progress", "lead.created"] {
        let notified = Arc::clone(&notified);
        bus.on(event, move |_| {
            let notified = Arc::clone(&notified);
            async move {
                notified.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        })
        .await;
    }

    // Lifecycle side: payment confirmation on an order.
    let repo = Arc::new(MemoryRepository::new());
    let id = repo.insert(Order::new("buyer-1", "svc-logo", 20_000)).await;
    let engine = TransitionEngine::new(repo, Arc::new(OrderEffects), Arc::clone(&bus));
    let order = engine
        .transition(id, OrderState::InProgress, TransitionMeta::by("gateway"))
        .await
        .unwrap();
    assert!(order.paid_at.is_some());

    // Dialogue side: a lead captured over five chat turns.
    let chat = chat_on(Arc::clone(&bus));
    chat.chat(request("I need my garden landscaped")).await;
    chat.chat(request("backyard")).await; // platform
    chat.chat(request("Portugal")).await; // country
    chat.chat(request("no rush")).await; // urgency
    let reply = chat.chat(request("skip")).await; // budget
    assert!(reply.reply.contains("reference is"));

    sleep(Duration::from_millis(50)).await;
    assert_eq!(notified.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_duplicate_expiry_sweep_cannot_double_apply() {
    let bus = Arc::new(EventBus::new());
    let repo = Arc::new(MemoryRepository::new());
    let mut rental = Rental::new("renter-1", "listing-1", chrono::Utc::now());
    rental.status = RentalState::Active;
    let id = repo.insert(rental).await;
    let engine = TransitionEngine::new(repo.clone(), Arc::new(RentalEffects), bus);

    let first = engine
        .batch_transition(&[id], RentalState::Expired, TransitionMeta::by("sweep"))
        .await;
    assert!(first[0].success());

    // A second sweep run finds the status marker already set and the graph
    // rejects the duplicate edge.
    let second = engine
        .batch_transition(&[id], RentalState::Expired, TransitionMeta::by("sweep"))
        .await;
    assert!(!second[0].success());

    let stored = repo.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(stored.audit_log.len(), 1);
}

#[tokio::test]
async fn test_failing_notification_hook_blocks_neither_machine() {
    let bus = Arc::new(EventBus::new());
    bus.on("transition", |_| async { Err(HookError::new("smtp down")) })
        .await;
    bus.on("lead.created", |_| async { Err(HookError::new("smtp down")) })
        .await;

    let repo = Arc::new(MemoryRepository::new());
    let id = repo.insert(Order::new("buyer-1", "svc-1", 100)).await;
    let engine = TransitionEngine::new(repo, Arc::new(OrderEffects), Arc::clone(&bus));
    engine
        .transition(id, OrderState::InProgress, TransitionMeta::default())
        .await
        .unwrap();

    let chat = chat_on(bus);
    chat.chat(request("I need a mural painted")).await;
    chat.chat(request("office wall")).await;
    chat.chat(request("Spain")).await;
    chat.chat(request("urgent")).await;
    let reply = chat.chat(request("skip")).await;

    assert!(reply.reply.contains("reference is"));
}
