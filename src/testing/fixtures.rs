//! Test fixtures providing pre-built test objects
//!
//! Unwrapping is acceptable here: a fixture that cannot be built is a broken test.

use std::sync::Arc;

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;

use super::constants::{
    TEST_ACCESS_TOKEN, TEST_CLIENT_ID, TEST_EMAIL, TEST_PICTURE, TEST_SESSION_KEY, TEST_STATE,
    TEST_SUBJECT, TEST_USER_NAME,
};
use crate::app::AppServices;
use crate::catalog::{CatalogDb, Category, Item, ItemData};
use crate::oauth::{IdentityProvider, LoginHandshake};
use crate::session::store::{ACCESS_TOKEN, CREDENTIALS, EMAIL, GPLUS_ID, PICTURE, STATE, USERNAME};
use crate::session::{LoginSession, SessionManager, COOKIE_NAME};
use crate::settings::{CatalogSettings, CookieSettings, GoogleSettings, SessionSettings};
use crate::utils::crypto::decrypt_data;

/// Central fixture provider for all test data
pub struct TestFixtures;

impl TestFixtures {
    /// Create standard test settings
    #[must_use]
    pub fn settings() -> CatalogSettings {
        CatalogSettings {
            session: SessionSettings {
                session_duration_hours: 24,
                session_secret: String::from_utf8_lossy(TEST_SESSION_KEY).into_owned(),
            },
            cookies: CookieSettings { secure: false },
            google: GoogleSettings {
                client_id: Some(TEST_CLIENT_ID.to_string()),
                client_secret: Some("test-secret".to_string()),
                client_id_env: None,
                client_secret_env: None,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Create a session manager with default test configuration
    #[must_use]
    pub fn session_manager() -> SessionManager {
        SessionManager::new(TEST_SESSION_KEY, false, 24)
    }

    #[must_use]
    pub fn handshake(provider: Arc<dyn IdentityProvider>) -> LoginHandshake {
        LoginHandshake::new(provider, TEST_CLIENT_ID)
    }

    /// Services wired the same way `main` wires them
    #[must_use]
    pub fn services(provider: Arc<dyn IdentityProvider>, catalog: CatalogDb) -> AppServices {
        AppServices {
            session_manager: Self::session_manager(),
            handshake: Self::handshake(provider),
            catalog,
        }
    }

    /// A session that has visited the login page
    #[must_use]
    pub fn pending_session() -> LoginSession {
        LoginSession::from([(STATE, TEST_STATE)])
    }

    /// A session after a completed login
    #[must_use]
    pub fn logged_in_session() -> LoginSession {
        LoginSession::from([
            (CREDENTIALS, r#"{"access_token":"ya29.test-access-token"}"#),
            (ACCESS_TOKEN, TEST_ACCESS_TOKEN),
            (GPLUS_ID, TEST_SUBJECT),
            (USERNAME, TEST_USER_NAME),
            (EMAIL, TEST_EMAIL),
            (PICTURE, TEST_PICTURE),
        ])
    }

    /// Encrypted cookie carrying `session`
    ///
    /// # Panics
    ///
    /// Panics if encryption fails
    #[must_use]
    pub fn session_cookie(session: &LoginSession) -> Cookie<'static> {
        Self::session_manager()
            .cookie_factory()
            .create_session_cookie(session)
            .unwrap()
    }

    /// Decrypt the session cookie set by a response
    ///
    /// `None` if the response sets no session cookie or expires it.
    #[must_use]
    pub fn session_from_response<B>(response: &ServiceResponse<B>) -> Option<LoginSession> {
        let cookie = response
            .response()
            .cookies()
            .find(|c| c.name() == COOKIE_NAME)?;
        if cookie.value().is_empty() {
            return None;
        }
        decrypt_data(cookie.value(), Self::session_manager().encryption_key()).ok()
    }

    /// # Panics
    ///
    /// Panics if the in-memory database cannot be created
    pub async fn catalog_db() -> CatalogDb {
        CatalogDb::in_memory().await.unwrap()
    }

    /// Database with "Soccer" (Ball, Cleats) and "Hockey" (Stick)
    ///
    /// # Panics
    ///
    /// Panics if the database cannot be seeded
    pub async fn seeded_catalog_db() -> CatalogDb {
        let db = Self::catalog_db().await;
        let soccer = Category::create(&db.pool, "Soccer").await.unwrap();
        let hockey = Category::create(&db.pool, "Hockey").await.unwrap();
        for (title, category_id) in [("Ball", soccer.id), ("Cleats", soccer.id), ("Stick", hockey.id)] {
            Item::create(
                &db.pool,
                &ItemData {
                    title: title.to_string(),
                    description: format!("A {} item", title.to_lowercase()),
                    category_id,
                },
            )
            .await
            .unwrap();
        }
        db
    }
}
