// Centralized logging for the login and logout handshakes
use log::{debug, info, warn};

pub struct LoggingHelper;

impl LoggingHelper {
    /// Log provider initialization status
    pub fn log_provider_init(provider_name: &str, client_id: &str) {
        info!("✅ {provider_name} OAuth2 configured (client_id: {client_id})");
    }

    /// Log token exchange start
    pub fn log_token_exchange_start(provider: &str) {
        info!("🔄 Exchanging authorization code for tokens with {provider}");
    }

    /// Log token exchange summary
    pub fn log_token_exchange_summary(provider: &str, has_refresh_token: bool, scope: Option<&str>) {
        info!(
            "🔍 Token exchange summary for {provider}: refresh_token={}, scope={scope:?}",
            if has_refresh_token { "present" } else { "missing" }
        );
    }

    /// Log a rejected handshake step
    pub fn log_handshake_rejected(step: &str, reason: &str) {
        warn!("Login handshake rejected at {step}: {reason}");
    }

    /// Log that the caller already holds a session for the subject
    pub fn log_already_connected(subject: &str) {
        debug!("Subject {subject} is already connected, skipping userinfo");
    }

    /// Log session creation success
    pub fn log_session_created(username: &str, email: &str) {
        info!("Successfully built session for user: {username} ({email})");
    }

    /// Log logout outcome
    pub fn log_disconnect(revoke_status: Option<u16>) {
        match revoke_status {
            Some(200) => info!("Token revoked, session identity cleared"),
            Some(status) => warn!("Token revoke failed with status {status}"),
            None => warn!("Token revoke request could not be sent"),
        }
    }
}
