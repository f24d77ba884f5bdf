use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use std::fs;

pub const GOOGLE_TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
pub const GOOGLE_TOKENINFO_ENDPOINT: &str = "https://www.googleapis.com/oauth2/v1/tokeninfo";
pub const GOOGLE_USERINFO_ENDPOINT: &str = "https://www.googleapis.com/oauth2/v1/userinfo";
pub const GOOGLE_REVOKE_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/revoke";

pub use crate::session::cookie::MAX_SESSION_DURATION_HOURS;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CatalogSettings {
    pub application: ApplicationSettings,
    pub session: SessionSettings,
    pub cookies: CookieSettings,
    pub logging: LoggingSettings,
    pub database: DatabaseSettings,
    pub google: GoogleSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationSettings {
    pub name: String,
    pub host: String,
    pub port: u16,
    pub cors_origins: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub session_duration_hours: u64,
    pub session_secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CookieSettings {
    pub secure: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
}

/// Google identity provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleSettings {
    // Direct values (can be overridden by environment variables)
    pub client_id: Option<String>,
    pub client_secret: Option<String>,

    // Environment variable names for overrides
    pub client_id_env: Option<String>,
    pub client_secret_env: Option<String>,

    /// Path to a `client_secrets.json` downloaded from the Google console
    pub client_secrets_path: Option<String>,

    pub token_endpoint: String,
    pub tokeninfo_endpoint: String,
    pub userinfo_endpoint: String,
    pub revoke_endpoint: String,

    /// Redirect URI sent with the code exchange (`postmessage` for the JS sign-in flow)
    pub redirect_uri: String,
}

/// The `web` section of a Google `client_secrets.json`
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecretsWeb {
    pub client_id: String,
    pub client_secret: Option<String>,
    pub token_uri: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ClientSecretsFile {
    web: ClientSecretsWeb,
}

impl Default for ApplicationSettings {
    fn default() -> Self {
        Self {
            name: "Item Catalog".to_string(),
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: "http://localhost:8000".to_string(),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            session_duration_hours: 24,
            session_secret: String::new(), // Will be generated if empty
        }
    }
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self { secure: true }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: "sqlite://data.sqlite3?mode=rwc".to_string(),
            max_connections: 5,
        }
    }
}

impl Default for GoogleSettings {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            client_id_env: Some("GOOGLE_CLIENT_ID".to_string()),
            client_secret_env: Some("GOOGLE_CLIENT_SECRET".to_string()),
            client_secrets_path: None,
            token_endpoint: GOOGLE_TOKEN_ENDPOINT.to_string(),
            tokeninfo_endpoint: GOOGLE_TOKENINFO_ENDPOINT.to_string(),
            userinfo_endpoint: GOOGLE_USERINFO_ENDPOINT.to_string(),
            revoke_endpoint: GOOGLE_REVOKE_ENDPOINT.to_string(),
            redirect_uri: "postmessage".to_string(),
        }
    }
}

impl CatalogSettings {
    /// Load settings from configuration files and environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Logger initialization fails
    /// - Settings file cannot be read or parsed
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        Self::load_env_file();

        let (mut settings, sources) = Self::load_base_settings()?;
        Self::apply_logging_env_overrides(&mut settings.logging);
        Self::initialize_logging(&settings.logging)?;
        for source in &sources {
            log::info!("{source}");
        }

        Self::apply_env_overrides(&mut settings);

        Ok(settings)
    }

    /// Initialize `env_logger` with the configured filter directives
    ///
    /// # Errors
    ///
    /// Returns an error if a logger is already installed
    fn initialize_logging(logging: &LoggingSettings) -> Result<(), Box<dyn std::error::Error>> {
        Self::logger_builder(logging).try_init()?;
        Ok(())
    }

    fn logger_builder(logging: &LoggingSettings) -> env_logger::Builder {
        let mut builder = env_logger::Builder::new();
        builder.parse_filters(&logging.level);
        builder
    }

    /// Load base settings from TOML file(s) or use defaults
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (applied separately after loading base settings)
    /// 2. Settings.toml in `CATALOG_SECRETS_DIR` (if specified and exists)
    /// 3. Settings.toml in current directory (if exists)
    /// 4. Default settings
    ///
    /// # Errors
    ///
    /// Returns an error if a settings file cannot be read or parsed.
    /// The returned notes are logged once the logger is up.
    fn load_base_settings() -> Result<(Self, Vec<String>), Box<dyn std::error::Error>> {
        let mut settings = Self::default();
        let mut notes = Vec::new();

        let default_config_path = std::path::PathBuf::from("Settings.toml");
        if default_config_path.exists() {
            settings = Self::from_file(&default_config_path)?;
            notes.push(format!(
                "Loaded base settings from {}",
                default_config_path.display()
            ));
        }

        if let Ok(secrets_dir) = std::env::var("CATALOG_SECRETS_DIR") {
            let secrets_path = std::path::Path::new(&secrets_dir).join("Settings.toml");
            if secrets_path.exists() {
                settings = Self::from_file(&secrets_path)?;
                notes.push(format!("Overriding settings from {}", secrets_path.display()));
            } else {
                notes.push(format!(
                    "CATALOG_SECRETS_DIR set but no Settings.toml found at: {}",
                    secrets_path.display()
                ));
            }
        }

        Ok((settings, notes))
    }

    /// Parse a single TOML settings file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML
    pub fn from_file(path: &std::path::Path) -> Result<Self, Box<dyn std::error::Error>> {
        let toml_content = fs::read_to_string(path)?;
        Ok(basic_toml::from_str(&toml_content)?)
    }

    /// Apply environment variable overrides to settings
    pub fn apply_env_overrides(settings: &mut Self) {
        Self::apply_application_env_overrides(&mut settings.application);
        Self::apply_session_env_overrides(&mut settings.session);
        Self::apply_cookie_env_overrides(&mut settings.cookies);
        Self::apply_logging_env_overrides(&mut settings.logging);
        Self::apply_database_env_overrides(&mut settings.database);
        Self::apply_google_env_overrides(&mut settings.google);
    }

    fn apply_application_env_overrides(app_settings: &mut ApplicationSettings) {
        if let Ok(host) = std::env::var("HOST") {
            app_settings.host = host;
        }
        if let Ok(port_str) = std::env::var("PORT") {
            if let Ok(port) = port_str.parse::<u16>() {
                app_settings.port = port;
            }
        }
        if let Ok(cors_origins) = std::env::var("CORS_ORIGINS") {
            app_settings.cors_origins = cors_origins;
        }
    }

    /// Apply environment overrides for session settings
    pub fn apply_session_env_overrides(session_settings: &mut SessionSettings) {
        if let Ok(value_str) = std::env::var("SESSION_DURATION_HOURS") {
            if let Ok(value) = value_str.parse::<u64>() {
                session_settings.session_duration_hours = value;
            }
        }
        if session_settings.session_duration_hours > MAX_SESSION_DURATION_HOURS {
            log::warn!(
                "session_duration_hours {} exceeds the maximum; using {MAX_SESSION_DURATION_HOURS}",
                session_settings.session_duration_hours
            );
            session_settings.session_duration_hours = MAX_SESSION_DURATION_HOURS;
        }

        Self::handle_session_secret_override(session_settings);
    }

    fn handle_session_secret_override(session_settings: &mut SessionSettings) {
        let env_secret_set = std::env::var("SESSION_SECRET").is_ok_and(|secret| {
            if secret.is_empty() {
                false
            } else {
                session_settings.session_secret = secret;
                true
            }
        });

        if !env_secret_set && session_settings.session_secret.is_empty() {
            session_settings.session_secret = Self::generate_random_session_secret();
            Self::warn_about_generated_secret();
        }
    }

    /// 32 bytes (256 bits) of entropy for AES-256
    fn generate_random_session_secret() -> String {
        use rand::RngCore;
        let mut secret = [0u8; 32];
        rand::rng().fill_bytes(&mut secret);
        general_purpose::STANDARD.encode(secret)
    }

    fn warn_about_generated_secret() {
        log::warn!("Using auto-generated session secret; sessions will not survive a restart");
        log::warn!("Set SESSION_SECRET or configure session_secret in Settings.toml for production use");
    }

    fn apply_cookie_env_overrides(cookie_settings: &mut CookieSettings) {
        if let Ok(cookie_secure_str) = std::env::var("COOKIE_SECURE") {
            if let Ok(cookie_secure) = cookie_secure_str.parse::<bool>() {
                cookie_settings.secure = cookie_secure;
            }
        }
    }

    fn apply_logging_env_overrides(logging_settings: &mut LoggingSettings) {
        if let Ok(log_level) = std::env::var("RUST_LOG") {
            logging_settings.level = log_level;
        }
    }

    fn apply_database_env_overrides(database_settings: &mut DatabaseSettings) {
        if let Ok(url) = std::env::var("DATABASE_URL") {
            database_settings.url = url;
        }
    }

    fn apply_google_env_overrides(google_settings: &mut GoogleSettings) {
        if let Ok(path) = std::env::var("CLIENT_SECRETS_PATH") {
            google_settings.client_secrets_path = Some(path);
        }
    }

    /// Load environment variables from .env file
    fn load_env_file() {
        if let Ok(contents) = std::fs::read_to_string(".env") {
            for line in contents.lines() {
                let line = line.trim();
                if line.starts_with('#') {
                    continue;
                }
                if let Some((key, value)) = line.split_once('=') {
                    std::env::set_var(key.trim(), value.trim());
                }
            }
        }
    }

    /// Get the bind address for the server
    #[must_use]
    pub fn get_bind_address(&self) -> String {
        format!("{}:{}", self.application.host, self.application.port)
    }

    /// Get CORS origins as a vector of strings
    #[must_use]
    pub fn get_cors_origins(&self) -> Vec<String> {
        self.application
            .cors_origins
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

impl GoogleSettings {
    /// Get the client ID: environment variable, then direct value, then `client_secrets.json`
    #[must_use]
    pub fn get_client_id(&self) -> Option<String> {
        if let Some(env_var) = &self.client_id_env {
            if let Ok(value) = std::env::var(env_var) {
                return Some(value);
            }
        }
        self.client_id
            .clone()
            .or_else(|| self.load_client_secrets().map(|web| web.client_id))
    }

    /// Get the client secret: environment variable, then direct value, then `client_secrets.json`
    #[must_use]
    pub fn get_client_secret(&self) -> Option<String> {
        if let Some(env_var) = &self.client_secret_env {
            if let Ok(value) = std::env::var(env_var) {
                return Some(value);
            }
        }
        self.client_secret
            .clone()
            .or_else(|| self.load_client_secrets().and_then(|web| web.client_secret))
    }

    /// Token endpoint, preferring the one named in `client_secrets.json`
    #[must_use]
    pub fn get_token_endpoint(&self) -> String {
        if self.token_endpoint != GOOGLE_TOKEN_ENDPOINT {
            return self.token_endpoint.clone();
        }
        self.load_client_secrets()
            .and_then(|web| web.token_uri)
            .unwrap_or_else(|| self.token_endpoint.clone())
    }

    /// Read the `web` section of the configured `client_secrets.json`
    #[must_use]
    pub fn load_client_secrets(&self) -> Option<ClientSecretsWeb> {
        let path = self.client_secrets_path.as_ref()?;
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                log::warn!("Failed to read client secrets file {path}: {e}");
                return None;
            }
        };
        match serde_json::from_str::<ClientSecretsFile>(&contents) {
            Ok(file) => Some(file.web),
            Err(e) => {
                log::warn!("Failed to parse client secrets file {path}: {e}");
                None
            }
        }
    }
}
