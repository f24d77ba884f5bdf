//! Session Management Module
//!
//! # Modules
//!
//! - [`store`] - The `SessionStore` abstraction and the cookie-backed `LoginSession`
//! - [`cookie`] - Encrypted cookie creation and extraction
//! - [`manager`] - Request/response glue used by the handlers

pub mod cookie;
pub mod manager;
pub mod store;

pub use cookie::{CookieFactory, COOKIE_NAME, MAX_SESSION_DURATION_HOURS};
pub use manager::SessionManager;
pub use store::{LoginSession, SessionStore};
