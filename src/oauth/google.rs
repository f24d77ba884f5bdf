//! Google implementation of [`IdentityProvider`]

use crate::oauth::provider::{Credentials, IdentityProvider, ProviderError, TokenInfo, UserInfo};
use crate::settings::GoogleSettings;
use crate::utils::crypto::decode_jwt_payload;
use crate::utils::logging::LoggingHelper;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    id_token: Option<String>,
    refresh_token: Option<String>,
    token_type: Option<String>,
    expires_in: Option<u64>,
    scope: Option<String>,
}

/// Endpoint URLs used by [`GoogleIdentityProvider`]
#[derive(Debug, Clone)]
pub struct GoogleEndpoints {
    pub token: String,
    pub tokeninfo: String,
    pub userinfo: String,
    pub revoke: String,
}

impl Default for GoogleEndpoints {
    fn default() -> Self {
        let defaults = GoogleSettings::default();
        Self {
            token: defaults.token_endpoint,
            tokeninfo: defaults.tokeninfo_endpoint,
            userinfo: defaults.userinfo_endpoint,
            revoke: defaults.revoke_endpoint,
        }
    }
}

/// HTTP client for Google's OAuth2 endpoints
#[derive(Clone)]
pub struct GoogleIdentityProvider {
    http_client: reqwest::Client,
    client_id: String,
    client_secret: Option<String>,
    redirect_uri: String,
    endpoints: GoogleEndpoints,
}

impl GoogleIdentityProvider {
    #[must_use]
    pub fn new(
        client_id: String,
        client_secret: Option<String>,
        redirect_uri: String,
        endpoints: GoogleEndpoints,
    ) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            client_id,
            client_secret,
            redirect_uri,
            endpoints,
        }
    }

    /// Build the provider from settings
    ///
    /// # Errors
    ///
    /// Returns an error if no client id is configured
    pub fn from_settings(settings: &GoogleSettings) -> Result<Self> {
        let client_id = settings.get_client_id().ok_or_else(|| {
            anyhow!("Google client_id is not configured (set GOOGLE_CLIENT_ID or client_secrets_path)")
        })?;
        let client_secret = settings.get_client_secret();
        if client_secret.is_none() {
            log::warn!("Google client_secret is not configured; code exchange will likely be rejected");
        }

        let endpoints = GoogleEndpoints {
            token: settings.get_token_endpoint(),
            tokeninfo: settings.tokeninfo_endpoint.clone(),
            userinfo: settings.userinfo_endpoint.clone(),
            revoke: settings.revoke_endpoint.clone(),
        };
        for endpoint in [
            &endpoints.token,
            &endpoints.tokeninfo,
            &endpoints.userinfo,
            &endpoints.revoke,
        ] {
            Url::parse(endpoint).map_err(|e| anyhow!("Invalid Google endpoint '{endpoint}': {e}"))?;
        }

        LoggingHelper::log_provider_init("Google", &client_id);
        Ok(Self::new(
            client_id,
            client_secret,
            settings.redirect_uri.clone(),
            endpoints,
        ))
    }

    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    fn subject_from_id_token(id_token: &str) -> Result<String, ProviderError> {
        let claims = decode_jwt_payload(id_token).map_err(ProviderError::InvalidResponse)?;
        claims["sub"]
            .as_str()
            .map(ToString::to_string)
            .ok_or_else(|| ProviderError::InvalidResponse("ID token has no sub claim".to_string()))
    }
}

#[async_trait]
impl IdentityProvider for GoogleIdentityProvider {
    async fn exchange_code(&self, code: &str) -> Result<Credentials, ProviderError> {
        let mut params = vec![
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", self.client_id.as_str()),
            ("redirect_uri", self.redirect_uri.as_str()),
        ];
        if let Some(secret) = &self.client_secret {
            params.push(("client_secret", secret.as_str()));
        }

        LoggingHelper::log_token_exchange_start("google");
        let response = self
            .http_client
            .post(&self.endpoints.token)
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("token response: {e}")))?;

        let id_token = token_response.id_token.ok_or_else(|| {
            ProviderError::InvalidResponse("token response has no id_token".to_string())
        })?;
        let subject = Self::subject_from_id_token(&id_token)?;

        LoggingHelper::log_token_exchange_summary(
            "google",
            token_response.refresh_token.is_some(),
            token_response.scope.as_deref(),
        );

        Ok(Credentials {
            access_token: token_response.access_token,
            subject,
            id_token: Some(id_token),
            refresh_token: token_response.refresh_token,
            token_type: token_response.token_type,
            expires_in: token_response.expires_in,
            scope: token_response.scope,
        })
    }

    async fn token_info(&self, access_token: &str) -> Result<TokenInfo, ProviderError> {
        // Google answers 400 with an `error` body for bad tokens; the body is the signal.
        let body = self
            .http_client
            .get(&self.endpoints.tokeninfo)
            .query(&[("access_token", access_token)])
            .send()
            .await?
            .text()
            .await?;

        serde_json::from_str(&body)
            .map_err(|e| ProviderError::InvalidResponse(format!("token info: {e}")))
    }

    async fn user_info(&self, access_token: &str) -> Result<UserInfo, ProviderError> {
        let response = self
            .http_client
            .get(&self.endpoints.userinfo)
            .query(&[("access_token", access_token), ("alt", "json")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("user info: {e}")))
    }

    async fn revoke(&self, access_token: &str) -> Result<u16, ProviderError> {
        let response = self
            .http_client
            .get(&self.endpoints.revoke)
            .query(&[("token", access_token)])
            .send()
            .await?;

        Ok(response.status().as_u16())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_from_id_token() {
        // {"sub":"sub-1","email":"user@example.com"}
        let token = "eyJhbGciOiJSUzI1NiJ9.eyJzdWIiOiJzdWItMSIsImVtYWlsIjoidXNlckBleGFtcGxlLmNvbSJ9.sig";
        assert_eq!(
            GoogleIdentityProvider::subject_from_id_token(token).unwrap(),
            "sub-1"
        );
    }

    #[test]
    fn test_id_token_without_sub_is_rejected() {
        // {"email":"user@example.com"}
        let token = "eyJhbGciOiJSUzI1NiJ9.eyJlbWFpbCI6InVzZXJAZXhhbXBsZS5jb20ifQ.sig";
        let err = GoogleIdentityProvider::subject_from_id_token(token).unwrap_err();
        assert!(matches!(err, ProviderError::InvalidResponse(_)));
    }

    #[test]
    fn test_from_settings_requires_client_id() {
        let settings = GoogleSettings {
            client_id_env: None,
            client_secret_env: None,
            ..Default::default()
        };
        assert!(GoogleIdentityProvider::from_settings(&settings).is_err());

        let settings = GoogleSettings {
            client_id: Some("client-x".to_string()),
            client_id_env: None,
            client_secret_env: None,
            ..Default::default()
        };
        let provider = GoogleIdentityProvider::from_settings(&settings).unwrap();
        assert_eq!(provider.client_id(), "client-x");
        assert_eq!(provider.endpoints.tokeninfo, crate::settings::GOOGLE_TOKENINFO_ENDPOINT);
    }

    #[test]
    fn test_from_settings_rejects_malformed_endpoint() {
        let settings = GoogleSettings {
            client_id: Some("client-x".to_string()),
            client_id_env: None,
            client_secret_env: None,
            revoke_endpoint: "not a url".to_string(),
            ..Default::default()
        };
        assert!(GoogleIdentityProvider::from_settings(&settings).is_err());
    }
}
