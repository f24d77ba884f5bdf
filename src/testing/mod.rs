//! Testing utilities for the item catalog
//!
//! Compiled for unit tests and, behind the `testing` feature, for the
//! integration tests under `tests/`.
//!
//! ## Organization
//!
//! - [`fixtures`] - Pre-built settings, sessions, databases and apps
//! - [`mock`] - `FakeIdentityProvider`, an in-process identity provider
//! - [`assertions`] - Assertion helpers for responses
//!
//! ## Usage
//!
//! ```rust,ignore
//! use item_catalog::testing::{mock::FakeIdentityProvider, TestFixtures};
//!
//! let provider = std::sync::Arc::new(FakeIdentityProvider::new());
//! let handshake = TestFixtures::handshake(provider.clone());
//! let session = TestFixtures::logged_in_session();
//! ```

pub mod assertions;
pub mod fixtures;
pub mod mock;

pub use assertions::*;
pub use fixtures::TestFixtures;

/// Common test constants
pub mod constants {
    /// Client id the fake provider issues tokens to
    pub const TEST_CLIENT_ID: &str = "client-x";

    /// Anti-forgery nonce stored in pending sessions
    pub const TEST_STATE: &str = "ABC123";

    /// The only authorization code the fake provider accepts
    pub const TEST_CODE: &str = "validcode";

    /// Subject identifier of the test user
    pub const TEST_SUBJECT: &str = "sub-1";

    pub const TEST_ACCESS_TOKEN: &str = "ya29.test-access-token";

    pub const TEST_USER_NAME: &str = "Jane Doe";

    pub const TEST_EMAIL: &str = "jane@example.com";

    pub const TEST_PICTURE: &str = "https://example.com/jane.png";

    /// Session cookie key (256 bits)
    pub const TEST_SESSION_KEY: &[u8] = b"test_key_32_bytes_long_for_test_";
}
