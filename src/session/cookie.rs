use actix_web::cookie::{time::Duration, Cookie, SameSite};
use actix_web::HttpRequest;
use anyhow::Result;

use crate::session::store::LoginSession;
use crate::utils::crypto::{decrypt_data, encrypt_data};

/// Name of the encrypted session cookie
pub const COOKIE_NAME: &str = "catalog_session";

/// Upper bound on the session cookie lifetime (one year)
pub const MAX_SESSION_DURATION_HOURS: u64 = 24 * 365;

/// Cookie factory for creating encrypted cookies with proper configuration
#[derive(Clone)]
pub struct CookieFactory {
    encryption_key: [u8; 32],
    cookie_secure: bool,
    session_duration_hours: u64,
}

impl CookieFactory {
    #[must_use]
    pub fn new(encryption_key: [u8; 32], cookie_secure: bool, session_duration_hours: u64) -> Self {
        Self {
            encryption_key,
            cookie_secure,
            session_duration_hours,
        }
    }

    /// Create the encrypted session cookie for a [`LoginSession`]
    ///
    /// # Errors
    ///
    /// Returns an error if encryption fails
    pub fn create_session_cookie(&self, session: &LoginSession) -> Result<Cookie<'static>> {
        let value = encrypt_data(session, &self.encryption_key)?;

        Ok(Cookie::build(COOKIE_NAME, value)
            .http_only(true)
            .secure(self.cookie_secure)
            .same_site(SameSite::Lax)
            .path("/")
            .max_age(self.max_age())
            .finish())
    }

    fn max_age(&self) -> Duration {
        let hours = self.session_duration_hours.min(MAX_SESSION_DURATION_HOURS);
        Duration::hours(i64::try_from(hours).unwrap_or(24))
    }

    /// Create an expired cookie to clear the session
    #[must_use]
    pub fn create_expired_cookie(&self) -> Cookie<'static> {
        create_expired_cookie(COOKIE_NAME, self.cookie_secure)
    }

    /// Read the session from the request cookie
    ///
    /// Missing, tampered or otherwise undecryptable cookies are treated as
    /// "no session" rather than as errors.
    #[must_use]
    pub fn get_session_from_request(&self, req: &HttpRequest) -> Option<LoginSession> {
        let cookie = req.cookie(COOKIE_NAME)?;
        if cookie.value().is_empty() {
            return None;
        }
        match decrypt_data::<LoginSession>(cookie.value(), &self.encryption_key) {
            Ok(session) => Some(session),
            Err(e) => {
                log::warn!("Failed to decrypt session cookie: {e}");
                None
            }
        }
    }
}

/// Create an expired cookie to clear a specific cookie
#[must_use]
pub fn create_expired_cookie(name: &str, secure: bool) -> Cookie<'static> {
    Cookie::build(name.to_owned(), "")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(Duration::seconds(-1))
        .finish()
}
