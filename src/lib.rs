#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

/// Version of the item catalog application
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod app;
pub mod catalog;
pub mod handlers;
pub mod oauth;
pub mod session;
pub mod settings;
pub mod utils;
pub mod validation;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

/// Re-export commonly used items
pub use app::AppServices;
pub use catalog::CatalogDb;
pub use oauth::{GoogleIdentityProvider, IdentityProvider, LoginHandshake};
pub use session::{LoginSession, SessionManager, SessionStore};
pub use settings::CatalogSettings;
