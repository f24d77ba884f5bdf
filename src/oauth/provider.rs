//! Identity provider abstraction
//!
//! The login handshake needs four things from the provider: turn a one-time
//! code into a credential, introspect an access token, fetch the profile that
//! goes with it, and revoke it again on logout.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Errors talking to the identity provider
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("request to identity provider failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("identity provider returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid response from identity provider: {0}")]
    InvalidResponse(String),
}

/// Credential obtained from the token endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub access_token: String,
    /// Stable subject identifier (`sub` claim of the ID token)
    pub subject: String,
    pub id_token: Option<String>,
    pub refresh_token: Option<String>,
    pub token_type: Option<String>,
    pub expires_in: Option<u64>,
    pub scope: Option<String>,
}

impl Credentials {
    /// Opaque serialized form kept in the session
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Result of the token-info (introspection) endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TokenInfo {
    pub error: Option<String>,
    pub user_id: Option<String>,
    pub issued_to: Option<String>,
    pub email: Option<String>,
    pub expires_in: Option<i64>,
}

/// Profile returned by the userinfo endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub name: String,
    #[serde(default)]
    pub picture: String,
    #[serde(default)]
    pub email: String,
}

/// The identity provider endpoints used by the login and logout handshakes
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Exchange an authorization code for a credential
    ///
    /// # Errors
    ///
    /// Returns an error if the provider rejects the code or the response is unusable
    async fn exchange_code(&self, code: &str) -> Result<Credentials, ProviderError>;

    /// Introspect an access token
    ///
    /// Provider-side rejections are reported through [`TokenInfo::error`];
    /// only transport or decoding failures are returned as `Err`.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint cannot be reached or its body cannot be decoded
    async fn token_info(&self, access_token: &str) -> Result<TokenInfo, ProviderError>;

    /// Fetch the profile for an access token
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint fails or returns an unusable body
    async fn user_info(&self, access_token: &str) -> Result<UserInfo, ProviderError>;

    /// Revoke an access token, returning the HTTP status of the revoke endpoint
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint cannot be reached
    async fn revoke(&self, access_token: &str) -> Result<u16, ProviderError>;
}
