//! Repository seam
//!
//! The engine depends on abstract find/save capabilities injected at
//! construction; it never reaches for a concrete storage module itself.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use lifecycle_core::{Lifecycle, Result};

/// Per-entity-type storage capabilities consumed by the engine.
///
/// The final `save` is the only write the engine performs per transition:
/// status, audit entry and timeline entry land in storage as one unit.
#[async_trait]
pub trait EntityRepository<E: Lifecycle>: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<E>>;

    async fn save(&self, entity: &E) -> Result<()>;
}

/// In-memory repository for tests and single-process deployments.
#[derive(Default)]
pub struct MemoryRepository<E> {
    records: Arc<RwLock<HashMap<Uuid, E>>>,
}

impl<E: Lifecycle> MemoryRepository<E> {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Seed a record, returning its id.
    pub async fn insert(&self, entity: E) -> Uuid {
        let id = entity.id();
        self.records.write().await.insert(id, entity);
        id
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl<E: Lifecycle> EntityRepository<E> for MemoryRepository<E> {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<E>> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn save(&self, entity: &E) -> Result<()> {
        self.records.write().await.insert(entity.id(), entity.clone());
        Ok(())
    }
}
