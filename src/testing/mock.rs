//! Fake identity provider for isolated handshake tests
//!
//! Accepts exactly [`TEST_CODE`] and answers every other endpoint from its
//! configuration, counting calls so tests can assert which endpoints were hit.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::constants::{
    TEST_ACCESS_TOKEN, TEST_CLIENT_ID, TEST_CODE, TEST_EMAIL, TEST_PICTURE, TEST_SUBJECT,
    TEST_USER_NAME,
};
use crate::oauth::provider::{Credentials, IdentityProvider, ProviderError, TokenInfo, UserInfo};

pub struct FakeIdentityProvider {
    token_user_id: String,
    issued_to: String,
    token_info_error: Option<String>,
    token_info_unreachable: bool,
    user_name: String,
    user_info_fails: bool,
    revoke_status: u16,
    revoke_unreachable: bool,
    exchange_calls: AtomicUsize,
    user_info_calls: AtomicUsize,
    revoked: Mutex<Vec<String>>,
}

impl Default for FakeIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeIdentityProvider {
    /// A provider for which the whole handshake succeeds
    #[must_use]
    pub fn new() -> Self {
        Self {
            token_user_id: TEST_SUBJECT.to_string(),
            issued_to: TEST_CLIENT_ID.to_string(),
            token_info_error: None,
            token_info_unreachable: false,
            user_name: TEST_USER_NAME.to_string(),
            user_info_fails: false,
            revoke_status: 200,
            revoke_unreachable: false,
            exchange_calls: AtomicUsize::new(0),
            user_info_calls: AtomicUsize::new(0),
            revoked: Mutex::new(Vec::new()),
        }
    }

    /// Token info reports a different `user_id` than the credential subject
    #[must_use]
    pub fn with_token_user_id(mut self, user_id: &str) -> Self {
        self.token_user_id = user_id.to_string();
        self
    }

    /// Token info reports a different `issued_to`
    #[must_use]
    pub fn with_issued_to(mut self, client_id: &str) -> Self {
        self.issued_to = client_id.to_string();
        self
    }

    /// Token info answers with an `error` field
    #[must_use]
    pub fn with_token_info_error(mut self, error: &str) -> Self {
        self.token_info_error = Some(error.to_string());
        self
    }

    /// The token-info endpoint cannot be reached
    #[must_use]
    pub fn with_token_info_transport_failure(mut self) -> Self {
        self.token_info_unreachable = true;
        self
    }

    /// Userinfo answers with this display name
    #[must_use]
    pub fn with_user_name(mut self, name: &str) -> Self {
        self.user_name = name.to_string();
        self
    }

    #[must_use]
    pub fn with_user_info_failure(mut self) -> Self {
        self.user_info_fails = true;
        self
    }

    #[must_use]
    pub fn with_revoke_status(mut self, status: u16) -> Self {
        self.revoke_status = status;
        self
    }

    /// The revoke endpoint cannot be reached; the token is still recorded
    #[must_use]
    pub fn with_revoke_transport_failure(mut self) -> Self {
        self.revoke_unreachable = true;
        self
    }

    #[must_use]
    pub fn exchange_calls(&self) -> usize {
        self.exchange_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn user_info_calls(&self) -> usize {
        self.user_info_calls.load(Ordering::SeqCst)
    }

    /// Tokens passed to `revoke`, in call order
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned
    #[must_use]
    pub fn revoked_tokens(&self) -> Vec<String> {
        self.revoked.lock().unwrap().clone()
    }

    /// The profile returned by `user_info`
    #[must_use]
    pub fn user() -> UserInfo {
        UserInfo {
            name: TEST_USER_NAME.to_string(),
            picture: TEST_PICTURE.to_string(),
            email: TEST_EMAIL.to_string(),
        }
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentityProvider {
    async fn exchange_code(&self, code: &str) -> Result<Credentials, ProviderError> {
        self.exchange_calls.fetch_add(1, Ordering::SeqCst);
        if code != TEST_CODE {
            return Err(ProviderError::Status {
                status: 400,
                body: r#"{"error": "invalid_grant"}"#.to_string(),
            });
        }
        Ok(Credentials {
            access_token: TEST_ACCESS_TOKEN.to_string(),
            subject: TEST_SUBJECT.to_string(),
            id_token: None,
            refresh_token: None,
            token_type: Some("Bearer".to_string()),
            expires_in: Some(3600),
            scope: Some("openid email profile".to_string()),
        })
    }

    async fn token_info(&self, _access_token: &str) -> Result<TokenInfo, ProviderError> {
        if self.token_info_unreachable {
            return Err(ProviderError::InvalidResponse(
                "connection refused".to_string(),
            ));
        }
        if let Some(error) = &self.token_info_error {
            return Ok(TokenInfo {
                error: Some(error.clone()),
                ..TokenInfo::default()
            });
        }
        Ok(TokenInfo {
            error: None,
            user_id: Some(self.token_user_id.clone()),
            issued_to: Some(self.issued_to.clone()),
            email: Some(TEST_EMAIL.to_string()),
            expires_in: Some(3599),
        })
    }

    async fn user_info(&self, _access_token: &str) -> Result<UserInfo, ProviderError> {
        self.user_info_calls.fetch_add(1, Ordering::SeqCst);
        if self.user_info_fails {
            return Err(ProviderError::Status {
                status: 503,
                body: "unavailable".to_string(),
            });
        }
        Ok(UserInfo {
            name: self.user_name.clone(),
            ..Self::user()
        })
    }

    async fn revoke(&self, access_token: &str) -> Result<u16, ProviderError> {
        self.revoked
            .lock()
            .map_err(|_| ProviderError::InvalidResponse("revoke log poisoned".to_string()))?
            .push(access_token.to_string());
        if self.revoke_unreachable {
            return Err(ProviderError::InvalidResponse(
                "connection refused".to_string(),
            ));
        }
        Ok(self.revoke_status)
    }
}
