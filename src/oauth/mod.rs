//! Google sign-in
//!
//! # Modules
//!
//! - [`provider`] - The `IdentityProvider` seam and its data types
//! - [`google`] - Google's token, tokeninfo, userinfo and revoke endpoints over reqwest
//! - [`handshake`] - The login and logout handshakes

pub mod google;
pub mod handshake;
pub mod provider;

pub use google::{GoogleEndpoints, GoogleIdentityProvider};
pub use handshake::{ConnectOutcome, HandshakeError, LoginHandshake};
pub use provider::{Credentials, IdentityProvider, ProviderError, TokenInfo, UserInfo};
