//! Lead draft storage

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::draft::LeadDraft;
use crate::error::Result;

#[async_trait]
pub trait LeadStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<LeadDraft>>;

    async fn save(&self, draft: &LeadDraft) -> Result<()>;
}

/// In-memory store for tests and single-process deployments.
#[derive(Default)]
pub struct MemoryLeadStore {
    drafts: Arc<RwLock<HashMap<Uuid, LeadDraft>>>,
}

impl MemoryLeadStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.drafts.read().await.len()
    }

    pub async fn all(&self) -> Vec<LeadDraft> {
        self.drafts.read().await.values().cloned().collect()
    }
}

#[async_trait]
impl LeadStore for MemoryLeadStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<LeadDraft>> {
        Ok(self.drafts.read().await.get(&id).cloned())
    }

    async fn save(&self, draft: &LeadDraft) -> Result<()> {
        self.drafts.write().await.insert(draft.id, draft.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_and_find() {
        let store = MemoryLeadStore::new();
        let draft = LeadDraft::new("anon:a");
        let id = draft.id;

        store.save(&draft).await.unwrap();

        let found = store.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(found.identity_key, "anon:a");
    }

    #[tokio::test]
    async fn test_missing_draft_is_none() {
        let store = MemoryLeadStore::new();
        assert!(store.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
    }
}
