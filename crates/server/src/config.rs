//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ATELIER_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string
//! - `ATELIER_SESSION_SECRET` - Session signing secret (min 32 chars)
//! - `ATELIER_CLIENT_ORIGIN` - Public URL of the web client (CORS + email links)
//!
//! ## Optional
//! - `ATELIER_HOST` - Bind address (default: 127.0.0.1)
//! - `ATELIER_PORT` - Listen port (default: 3000)
//! - `ATELIER_SESSION_MAX_AGE_SECONDS` - Session cookie lifetime (default: 7 days)
//! - `ATELIER_MEDIA_ROOT` - Directory holding `images/{artwork_id}/` (default: media)
//! - `ATELIER_CACHE_ENABLED` - Enable the response cache (default: false)
//! - `ATELIER_CACHE_TTL_SECONDS` - Response cache TTL (default: 60)
//! - `SMTP_HOST`, `SMTP_PORT`, `SMTP_USERNAME`, `SMTP_PASSWORD`, `SMTP_FROM` -
//!   outbound mail; all five must be present or email is disabled
//! - `TRANSLATE_API_URL`, `TRANSLATE_API_KEY` - translation passthrough;
//!   both must be present or translation is disabled

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_SESSION_SECRET_LENGTH: usize = 32;

/// Default session cookie lifetime (7 days).
const DEFAULT_SESSION_MAX_AGE_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public origin of the web client, used for CORS and email links
    pub client_origin: String,
    /// Session signing secret
    pub session_secret: SecretString,
    /// Session cookie lifetime in seconds
    pub session_max_age_seconds: i64,
    /// Directory containing artwork media (`images/{artwork_id}/...`)
    pub media_root: PathBuf,
    /// Response cache settings
    pub cache: CacheConfig,
    /// Outbound email settings; `None` disables email
    pub email: Option<EmailConfig>,
    /// Translation API settings; `None` disables translation
    pub translate: Option<TranslateConfig>,
}

/// Response cache configuration.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Whether the response cache is active at all
    pub enabled: bool,
    /// Time-to-live for cached responses in seconds
    pub ttl_seconds: u64,
}

/// SMTP email configuration.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: SecretString,
    pub from_address: String,
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_username", &self.smtp_username)
            .field("smtp_password", &"[REDACTED]")
            .field("from_address", &self.from_address)
            .finish()
    }
}

/// Third-party translation API configuration.
#[derive(Clone)]
pub struct TranslateConfig {
    pub api_url: String,
    pub api_key: SecretString,
}

impl std::fmt::Debug for TranslateConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslateConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid,
    /// or if the session secret is too short.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("ATELIER_DATABASE_URL")?;
        let host = get_env_or_default("ATELIER_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("ATELIER_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("ATELIER_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("ATELIER_PORT".to_string(), e.to_string()))?;
        let client_origin = get_required_env("ATELIER_CLIENT_ORIGIN")?;
        let session_secret = get_required_secret("ATELIER_SESSION_SECRET")?;
        validate_session_secret(&session_secret, "ATELIER_SESSION_SECRET")?;
        let session_max_age_seconds = parse_env_or(
            "ATELIER_SESSION_MAX_AGE_SECONDS",
            DEFAULT_SESSION_MAX_AGE_SECONDS,
        )?;
        let media_root = PathBuf::from(get_env_or_default("ATELIER_MEDIA_ROOT", "media"));

        let cache = CacheConfig {
            enabled: get_env_or_default("ATELIER_CACHE_ENABLED", "false")
                .eq_ignore_ascii_case("true"),
            ttl_seconds: parse_env_or("ATELIER_CACHE_TTL_SECONDS", 60)?,
        };

        let email = EmailConfig::from_env()?;
        let translate = TranslateConfig::from_env();

        Ok(Self {
            database_url,
            host,
            port,
            client_origin,
            session_secret,
            session_max_age_seconds,
            media_root,
            cache,
            email,
            translate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl EmailConfig {
    /// Load the email block; returns `Ok(None)` when `SMTP_HOST` is unset.
    ///
    /// A partially configured block (host present, credentials missing) is an
    /// error rather than a silent disable.
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some(smtp_host) = get_optional_env("SMTP_HOST") else {
            return Ok(None);
        };

        let smtp_port = parse_env_or("SMTP_PORT", 587)?;
        let smtp_username = get_required_env("SMTP_USERNAME")?;
        let smtp_password = get_required_secret("SMTP_PASSWORD")?;
        let from_address = get_required_env("SMTP_FROM")?;

        Ok(Some(Self {
            smtp_host,
            smtp_port,
            smtp_username,
            smtp_password,
            from_address,
        }))
    }
}

impl TranslateConfig {
    /// Load the translation block; `None` when either variable is unset.
    fn from_env() -> Option<Self> {
        let api_url = get_optional_env("TRANSLATE_API_URL")?;
        let api_key = get_optional_env("TRANSLATE_API_KEY")?;
        Some(Self {
            api_url,
            api_key: SecretString::from(api_key),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    Ok(SecretString::from(value))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to a default when unset.
fn parse_env_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}

/// Validate that a session secret meets minimum length requirements.
fn validate_session_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_SESSION_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_SESSION_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_session_secret_too_short() {
        let secret = SecretString::from("short");
        let result = validate_session_secret(&secret, "TEST_SESSION");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_session_secret_valid_length() {
        let secret = SecretString::from("a".repeat(32));
        let result = validate_session_secret(&secret, "TEST_SESSION");
        assert!(result.is_ok());
    }

    #[test]
    fn test_socket_addr() {
        let config = AppConfig {
            database_url: SecretString::from("postgres://localhost/test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            client_origin: "http://localhost:8080".to_string(),
            session_secret: SecretString::from("x".repeat(32)),
            session_max_age_seconds: DEFAULT_SESSION_MAX_AGE_SECONDS,
            media_root: PathBuf::from("media"),
            cache: CacheConfig {
                enabled: false,
                ttl_seconds: 60,
            },
            email: None,
            translate: None,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_email_config_debug_redacts_password() {
        let config = EmailConfig {
            smtp_host: "smtp.example.com".to_string(),
            smtp_port: 587,
            smtp_username: "mailer".to_string(),
            smtp_password: SecretString::from("super_secret_password"),
            from_address: "no-reply@example.com".to_string(),
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("smtp.example.com"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_password"));
    }
}
