//! Session Manager - encrypted cookie sessions
//!
//! `SessionManager` is the single place handlers go to turn a request into a
//! [`LoginSession`] and a modified [`LoginSession`] back into a cookie.

use crate::session::cookie::CookieFactory;
use crate::session::store::LoginSession;
use crate::settings::CatalogSettings;
use crate::utils::crypto::derive_encryption_key;
use actix_web::cookie::Cookie;
use actix_web::{HttpRequest, HttpResponseBuilder};
use anyhow::Result;

/// Session Manager for stateless encrypted session handling
#[derive(Clone)]
pub struct SessionManager {
    encryption_key: [u8; 32],
    cookie_factory: CookieFactory,
}

impl SessionManager {
    #[must_use]
    pub fn new(key: &[u8], cookie_secure: bool, session_duration_hours: u64) -> Self {
        let encryption_key = derive_encryption_key(key);
        let cookie_factory =
            CookieFactory::new(encryption_key, cookie_secure, session_duration_hours);

        Self {
            encryption_key,
            cookie_factory,
        }
    }

    /// Build a session manager from loaded settings
    #[must_use]
    pub fn from_settings(settings: &CatalogSettings) -> Self {
        Self::new(
            settings.session.session_secret.as_bytes(),
            settings.cookies.secure,
            settings.session.session_duration_hours,
        )
    }

    /// Load the caller's session, falling back to an empty one
    #[must_use]
    pub fn load(&self, req: &HttpRequest) -> LoginSession {
        self.cookie_factory
            .get_session_from_request(req)
            .unwrap_or_default()
    }

    /// Create the cookie carrying `session`
    ///
    /// # Errors
    ///
    /// Returns an error if encryption fails
    pub fn session_cookie(&self, session: &LoginSession) -> Result<Cookie<'static>> {
        if session.is_empty() {
            return Ok(self.cookie_factory.create_expired_cookie());
        }
        self.cookie_factory.create_session_cookie(session)
    }

    /// Attach the session cookie to a response if the session was written to
    ///
    /// # Errors
    ///
    /// Returns an error if encryption fails
    pub fn persist(&self, builder: &mut HttpResponseBuilder, session: &LoginSession) -> Result<()> {
        if session.is_modified() {
            builder.cookie(self.session_cookie(session)?);
        }
        Ok(())
    }

    #[must_use]
    pub fn cookie_factory(&self) -> &CookieFactory {
        &self.cookie_factory
    }

    #[must_use]
    pub fn encryption_key(&self) -> &[u8; 32] {
        &self.encryption_key
    }
}
