//! Session storage trait and implementations

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::RwLock;

use dialog_core::DialogSession;

use crate::error::{Result, SessionError};

/// Session storage trait
#[async_trait]
pub trait SessionStorage: Send + Sync {
    /// Load a session by identity key.
    async fn load(&self, key: &str) -> Result<DialogSession>;

    /// Save a session under its identity key.
    async fn save(&self, key: &str, session: &DialogSession) -> Result<()>;

    /// Check if a session exists.
    async fn exists(&self, key: &str) -> bool;

    /// Delete a session.
    async fn delete(&self, key: &str) -> Result<()>;
}

/// In-memory session storage
#[derive(Clone, Default)]
pub struct MemorySessionStorage {
    sessions: Arc<RwLock<HashMap<String, DialogSession>>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStorage for MemorySessionStorage {
    async fn load(&self, key: &str) -> Result<DialogSession> {
        self.sessions
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or(SessionError::NotFound)
    }

    async fn save(&self, key: &str, session: &DialogSession) -> Result<()> {
        self.sessions
            .write()
            .await
            .insert(key.to_string(), session.clone());
        Ok(())
    }

    async fn exists(&self, key: &str) -> bool {
        self.sessions.read().await.contains_key(key)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.sessions.write().await.remove(key);
        Ok(())
    }
}

/// File-based session storage, one JSON document per identity key.
#[derive(Clone)]
pub struct FileSessionStorage {
    base_path: PathBuf,
}

impl FileSessionStorage {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    fn session_path(&self, key: &str) -> PathBuf {
        // Identity keys contain ':' which is unfriendly on some filesystems.
        let safe: String = key
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        self.base_path.join(format!("{safe}.json"))
    }
}

#[async_trait]
impl SessionStorage for FileSessionStorage {
    async fn load(&self, key: &str) -> Result<DialogSession> {
        let path = self.session_path(key);

        if !path.exists() {
            return Err(SessionError::NotFound);
        }

        let contents = fs::read_to_string(&path).await?;
        let session: DialogSession = serde_json::from_str(&contents)?;

        Ok(session)
    }

    async fn save(&self, key: &str, session: &DialogSession) -> Result<()> {
        fs::create_dir_all(&self.base_path).await?;

        let path = self.session_path(key);
        let contents = serde_json::to_string_pretty(session)?;

        fs::write(&path, contents).await?;

        Ok(())
    }

    async fn exists(&self, key: &str) -> bool {
        self.session_path(key).exists()
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.session_path(key);

        if path.exists() {
            fs::remove_file(&path).await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::tempdir;

    fn sample_session(key: &str) -> DialogSession {
        DialogSession::new(key, false, Duration::minutes(30))
    }

    #[tokio::test]
    async fn test_memory_storage_save_and_load() {
        let storage = MemorySessionStorage::new();
        let session = sample_session("anon:abc");

        storage.save("anon:abc", &session).await.unwrap();

        let loaded = storage.load("anon:abc").await.unwrap();
        assert_eq!(loaded.identity_key, "anon:abc");
    }

    #[tokio::test]
    async fn test_memory_storage_not_found() {
        let storage = MemorySessionStorage::new();
        assert!(matches!(
            storage.load("anon:missing").await,
            Err(SessionError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_file_storage_save_and_load() {
        let dir = tempdir().unwrap();
        let storage = FileSessionStorage::new(dir.path());

        let session = sample_session("user:42");
        storage.save("user:42", &session).await.unwrap();

        let loaded = storage.load("user:42").await.unwrap();
        assert_eq!(loaded.identity_key, "user:42");
    }

    #[tokio::test]
    async fn test_file_storage_delete() {
        let dir = tempdir().unwrap();
        let storage = FileSessionStorage::new(dir.path());

        let session = sample_session("anon:tok");
        storage.save("anon:tok", &session).await.unwrap();
        assert!(storage.exists("anon:tok").await);

        storage.delete("anon:tok").await.unwrap();
        assert!(!storage.exists("anon:tok").await);
    }
}
