//! Per-client session state
//!
//! The login handshake only ever talks to a [`SessionStore`]. In production the
//! store is a [`LoginSession`] that travels between requests inside an encrypted
//! cookie; tests can hand the handshake any other implementation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Session key holding the anti-forgery nonce issued by the login page
pub const STATE: &str = "state";
/// Session key holding the serialized provider credential
pub const CREDENTIALS: &str = "credentials";
/// Session key holding the provider access token
pub const ACCESS_TOKEN: &str = "access_token";
/// Session key holding the provider subject identifier
pub const GPLUS_ID: &str = "gplus_id";
/// Session key holding the display name from the userinfo endpoint
pub const USERNAME: &str = "username";
/// Session key holding the e-mail address from the userinfo endpoint
pub const EMAIL: &str = "email";
/// Session key holding the picture URL from the userinfo endpoint
pub const PICTURE: &str = "picture";

/// Identity fields removed on logout
pub const IDENTITY_KEYS: [&str; 6] = [CREDENTIALS, GPLUS_ID, ACCESS_TOKEN, USERNAME, EMAIL, PICTURE];

/// Key/value session storage scoped to a single client
pub trait SessionStore: Send {
    /// Read a value
    fn get(&self, key: &str) -> Option<String>;

    /// Insert or replace a value
    fn set(&mut self, key: &str, value: String);

    /// Remove a value, returning the previous one if it existed
    fn delete(&mut self, key: &str) -> Option<String>;

    /// Whether a key is present
    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

/// Cookie-backed session data
///
/// Tracks whether it has been written to so that handlers only re-issue the
/// session cookie when something actually changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginSession {
    values: BTreeMap<String, String>,
    #[serde(skip)]
    modified: bool,
}

impl LoginSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// True once `set` or a successful `delete` has been called
    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The logged-in user's display name, if any
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.values.get(USERNAME).map(String::as_str)
    }
}

impl SessionStore for LoginSession {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.values.insert(key.to_string(), value);
        self.modified = true;
    }

    fn delete(&mut self, key: &str) -> Option<String> {
        let removed = self.values.remove(key);
        if removed.is_some() {
            self.modified = true;
        }
        removed
    }

    fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }
}

impl<const N: usize> From<[(&str, &str); N]> for LoginSession {
    fn from(entries: [(&str, &str); N]) -> Self {
        Self {
            values: entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            modified: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_session_is_unmodified() {
        let session = LoginSession::new();
        assert!(session.is_empty());
        assert!(!session.is_modified());
        assert!(session.username().is_none());
    }

    #[test]
    fn test_set_and_delete_mark_modified() {
        let mut session = LoginSession::new();
        session.set(STATE, "ABC123".to_string());
        assert!(session.is_modified());
        assert_eq!(session.get(STATE).as_deref(), Some("ABC123"));

        let mut session = LoginSession::from([(USERNAME, "Jane")]);
        assert!(!session.is_modified());
        assert!(session.username().is_some());
        assert_eq!(session.delete(USERNAME).as_deref(), Some("Jane"));
        assert!(session.is_modified());
    }

    #[test]
    fn test_delete_missing_key_keeps_session_clean() {
        let mut session = LoginSession::from([(STATE, "ABC123")]);
        assert_eq!(session.delete(EMAIL), None);
        assert!(!session.is_modified());
    }

    #[test]
    fn test_modified_flag_is_not_serialized() {
        let mut session = LoginSession::new();
        session.set(EMAIL, "jane@example.com".to_string());

        let json = serde_json::to_string(&session).unwrap();
        let restored: LoginSession = serde_json::from_str(&json).unwrap();
        assert!(!restored.is_modified());
        assert_eq!(restored.get(EMAIL).as_deref(), Some("jane@example.com"));
    }
}
