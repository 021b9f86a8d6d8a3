//! Identity resolution
//!
//! Derives the stable key a dialogue session is stored under. An
//! authenticated user id always wins; otherwise the anonymous cookie token
//! presented by the client is reused, and only when neither exists is a
//! fresh token minted. Resolution is idempotent: the same inputs always
//! produce the same key.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Session lookup key, `user:{id}` or `anon:{token}`.
    pub key: String,

    pub authenticated: bool,

    /// Set only when a fresh anonymous token was minted this request; the
    /// transport layer persists it as a cookie so later requests resolve
    /// to the same key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issued_token: Option<String>,
}

impl Identity {
    pub fn resolve(auth_user_id: Option<&str>, anon_token: Option<&str>) -> Self {
        if let Some(user_id) = auth_user_id.filter(|id| !id.is_empty()) {
            return Self {
                key: format!("user:{user_id}"),
                authenticated: true,
                issued_token: None,
            };
        }

        if let Some(token) = anon_token.filter(|t| !t.is_empty()) {
            return Self {
                key: format!("anon:{token}"),
                authenticated: false,
                issued_token: None,
            };
        }

        let token = Uuid::new_v4().to_string();
        Self {
            key: format!("anon:{token}"),
            authenticated: false,
            issued_token: Some(token),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_id_wins_over_token() {
        let identity = Identity::resolve(Some("42"), Some("cookie-token"));
        assert_eq!(identity.key, "user:42");
        assert!(identity.authenticated);
        assert!(identity.issued_token.is_none());
    }

    #[test]
    fn test_presented_token_is_reused() {
        let first = Identity::resolve(None, Some("abc"));
        let second = Identity::resolve(None, Some("abc"));
        assert_eq!(first.key, second.key);
        assert!(first.issued_token.is_none());
    }

    #[test]
    fn test_fresh_token_is_minted_and_surfaced() {
        let identity = Identity::resolve(None, None);
        assert!(!identity.authenticated);
        let token = identity.issued_token.expect("minted token surfaced");
        assert_eq!(identity.key, format!("anon:{token}"));
    }

    #[test]
    fn test_empty_strings_are_treated_as_absent() {
        let identity = Identity::resolve(Some(""), Some(""));
        assert!(identity.issued_token.is_some());
    }
}
