//! Session store
//!
//! Load-or-create by identity key with sliding TTL. No per-document
//! locking: two concurrent turns on the same key interleave load/save and
//! the last write wins.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::debug;

use dialog_core::DialogSession;

use crate::error::{Result, SessionError};
use crate::identity::Identity;
use crate::storage::SessionStorage;

/// Default expiry window for authenticated sessions.
const AUTHENTICATED_WINDOW_HOURS: i64 = 24;
/// Default expiry window for anonymous sessions.
const ANONYMOUS_WINDOW_MINUTES: i64 = 30;

pub struct SessionStore<S: SessionStorage> {
    storage: Arc<S>,
    authenticated_window: Duration,
    anonymous_window: Duration,
}

impl<S: SessionStorage> SessionStore<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage: Arc::new(storage),
            authenticated_window: Duration::hours(AUTHENTICATED_WINDOW_HOURS),
            anonymous_window: Duration::minutes(ANONYMOUS_WINDOW_MINUTES),
        }
    }

    pub fn with_windows(storage: S, authenticated: Duration, anonymous: Duration) -> Self {
        Self {
            storage: Arc::new(storage),
            authenticated_window: authenticated,
            anonymous_window: anonymous,
        }
    }

    fn window(&self, authenticated: bool) -> Duration {
        if authenticated {
            self.authenticated_window
        } else {
            self.anonymous_window
        }
    }

    /// Load the session for an identity, creating it lazily.
    ///
    /// An expired record is deleted and replaced with a fresh session, so
    /// callers never observe stale flow state.
    pub async fn open(&self, identity: &Identity) -> Result<DialogSession> {
        let window = self.window(identity.authenticated);

        match self.storage.load(&identity.key).await {
            Ok(session) if !session.is_expired(Utc::now()) => Ok(session),
            Ok(_expired) => {
                debug!(key = %identity.key, "session expired, recreating");
                self.storage.delete(&identity.key).await?;
                Ok(DialogSession::new(
                    identity.key.as_str(),
                    identity.authenticated,
                    window,
                ))
            }
            Err(SessionError::NotFound) => Ok(DialogSession::new(
                identity.key.as_str(),
                identity.authenticated,
                window,
            )),
            Err(e) => Err(e),
        }
    }

    /// Persist a turn's mutations and slide the expiry window.
    pub async fn commit(&self, session: &mut DialogSession) -> Result<()> {
        let now = Utc::now();
        session.last_active_at = now;
        session.expires_at = now + self.window(session.authenticated);
        self.storage.save(&session.identity_key, session).await
    }

    /// Drop a session outright (admin reset, tests).
    pub async fn remove(&self, key: &str) -> Result<()> {
        self.storage.delete(key).await
    }
}
