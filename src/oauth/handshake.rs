//! Login and logout handshakes
//!
//! [`LoginHandshake::connect`] turns a one-time authorization code into an
//! authenticated session, and [`LoginHandshake::disconnect`] revokes the
//! stored token and clears the identity fields again. Both operate on an
//! injected [`SessionStore`] so they can run without a live HTTP session.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

use crate::oauth::provider::{IdentityProvider, ProviderError, UserInfo};
use crate::session::store::{
    SessionStore, ACCESS_TOKEN, CREDENTIALS, EMAIL, GPLUS_ID, IDENTITY_KEYS, PICTURE, STATE,
    USERNAME,
};
use crate::utils::crypto::state_token_matches;
use crate::utils::logging::LoggingHelper;
use crate::utils::responses::ResponseBuilder;

/// Handshake failures; each is terminal for the request
#[derive(Debug, thiserror::Error)]
pub enum HandshakeError {
    #[error("Invalid state parameter.")]
    InvalidState,
    #[error("Failed to upgrade the authorization code.")]
    CodeExchange(#[source] ProviderError),
    #[error("{0}")]
    TokenInfo(String),
    #[error("Token's user ID doesn't match given user ID.")]
    UserMismatch,
    #[error("Token's client ID does not match app's.")]
    ClientMismatch,
    #[error("Failed to fetch user info.")]
    UserInfo(#[source] ProviderError),
    #[error("Current user not connected.")]
    NotConnected,
    #[error("Failed to revoke token for given user.")]
    Revoke { status: Option<u16> },
    #[error("Failed to serialize credentials: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl HandshakeError {
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidState => "invalid_state",
            Self::CodeExchange(_) => "code_exchange_failed",
            Self::TokenInfo(_) => "token_info_error",
            Self::UserMismatch => "user_mismatch",
            Self::ClientMismatch => "client_mismatch",
            Self::UserInfo(_) => "userinfo_failed",
            Self::NotConnected => "not_connected",
            Self::Revoke { .. } => "revoke_failed",
            Self::Serialization(_) => "server_error",
        }
    }
}

impl ResponseError for HandshakeError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidState
            | Self::CodeExchange(_)
            | Self::UserMismatch
            | Self::ClientMismatch
            | Self::NotConnected => StatusCode::UNAUTHORIZED,
            Self::TokenInfo(_) | Self::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::UserInfo(_) => StatusCode::BAD_GATEWAY,
            Self::Revoke { .. } => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let builder = match self.status_code() {
            StatusCode::UNAUTHORIZED => ResponseBuilder::unauthorized(),
            StatusCode::BAD_REQUEST => ResponseBuilder::bad_request(),
            StatusCode::BAD_GATEWAY => ResponseBuilder::bad_gateway(),
            _ => ResponseBuilder::internal_server_error(),
        };
        builder
            .with_error_code(self.error_code())
            .with_message(&self.to_string())
            .build()
    }
}

/// Outcome of a successful [`LoginHandshake::connect`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// The session already held credentials for this subject; nothing was written
    AlreadyConnected,
    /// A new identity was stored in the session
    Connected(UserInfo),
}

/// Verifies provider credentials and establishes or tears down the login session
#[derive(Clone)]
pub struct LoginHandshake {
    provider: Arc<dyn IdentityProvider>,
    client_id: String,
}

impl LoginHandshake {
    #[must_use]
    pub fn new(provider: Arc<dyn IdentityProvider>, client_id: impl Into<String>) -> Self {
        Self {
            provider,
            client_id: client_id.into(),
        }
    }

    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Run the login handshake
    ///
    /// The session is written only when the whole sequence succeeds and the
    /// subject is not already connected.
    ///
    /// # Errors
    ///
    /// Returns the first failing check as a [`HandshakeError`]
    pub async fn connect(
        &self,
        session: &mut dyn SessionStore,
        state: Option<&str>,
        code: &str,
    ) -> Result<ConnectOutcome, HandshakeError> {
        let stored_state = session.get(STATE);
        match (state, stored_state.as_deref()) {
            (Some(given), Some(stored)) if state_token_matches(given, stored) => {}
            _ => {
                LoggingHelper::log_handshake_rejected("state check", "state mismatch");
                return Err(HandshakeError::InvalidState);
            }
        }

        let credentials = self.provider.exchange_code(code).await.map_err(|e| {
            LoggingHelper::log_handshake_rejected("code exchange", &e.to_string());
            HandshakeError::CodeExchange(e)
        })?;

        let token_info = self
            .provider
            .token_info(&credentials.access_token)
            .await
            .map_err(|e| {
                LoggingHelper::log_handshake_rejected("token info", &e.to_string());
                HandshakeError::TokenInfo(e.to_string())
            })?;
        if let Some(error) = token_info.error {
            LoggingHelper::log_handshake_rejected("token info", &error);
            return Err(HandshakeError::TokenInfo(error));
        }

        if token_info.user_id.as_deref() != Some(credentials.subject.as_str()) {
            LoggingHelper::log_handshake_rejected("audience check", "user id mismatch");
            return Err(HandshakeError::UserMismatch);
        }

        if token_info.issued_to.as_deref() != Some(self.client_id.as_str()) {
            LoggingHelper::log_handshake_rejected("client check", "issued_to mismatch");
            return Err(HandshakeError::ClientMismatch);
        }

        if session.contains(CREDENTIALS)
            && session.get(GPLUS_ID).as_deref() == Some(credentials.subject.as_str())
        {
            LoggingHelper::log_already_connected(&credentials.subject);
            return Ok(ConnectOutcome::AlreadyConnected);
        }

        let user_info = self
            .provider
            .user_info(&credentials.access_token)
            .await
            .map_err(HandshakeError::UserInfo)?;
        if user_info.name.trim().is_empty() {
            LoggingHelper::log_handshake_rejected("user info", "profile has no name");
            return Err(HandshakeError::UserInfo(ProviderError::InvalidResponse(
                "user info has no name".to_string(),
            )));
        }

        session.set(CREDENTIALS, credentials.to_json()?);
        session.set(ACCESS_TOKEN, credentials.access_token.clone());
        session.set(GPLUS_ID, credentials.subject.clone());
        session.set(USERNAME, user_info.name.clone());
        session.set(EMAIL, user_info.email.clone());
        session.set(PICTURE, user_info.picture.clone());
        session.delete(STATE);

        LoggingHelper::log_session_created(&user_info.name, &user_info.email);
        Ok(ConnectOutcome::Connected(user_info))
    }

    /// Run the logout handshake
    ///
    /// # Errors
    ///
    /// Returns [`HandshakeError::NotConnected`] without an access token in the
    /// session, or [`HandshakeError::Revoke`] if the provider does not answer 200.
    /// The session is left untouched on error.
    pub async fn disconnect(&self, session: &mut dyn SessionStore) -> Result<(), HandshakeError> {
        let access_token = session.get(ACCESS_TOKEN).ok_or(HandshakeError::NotConnected)?;

        let status = match self.provider.revoke(&access_token).await {
            Ok(status) => Some(status),
            Err(e) => {
                log::warn!("Revoke request failed: {e}");
                None
            }
        };
        LoggingHelper::log_disconnect(status);

        if status != Some(200) {
            return Err(HandshakeError::Revoke { status });
        }

        for key in IDENTITY_KEYS {
            session.delete(key);
        }
        Ok(())
    }
}
