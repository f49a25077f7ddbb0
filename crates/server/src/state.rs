//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;
use tracing::info;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::middleware::ResponseCache;
use crate::services::{EmailService, ResetTokenService, TranslationClient};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    pool: PgPool,
    email: Option<EmailService>,
    translator: Option<TranslationClient>,
    reset_tokens: ResetTokenService,
    response_cache: ResponseCache,
}

impl AppState {
    /// Create a new application state.
    ///
    /// Email and translation are optional features; when their config
    /// blocks are absent the corresponding service is `None` and the
    /// routes depending on it answer 503.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured service client fails to build.
    pub fn new(config: AppConfig, pool: PgPool) -> Result<Self, AppError> {
        let email = match &config.email {
            Some(email_config) => Some(
                EmailService::new(email_config)
                    .map_err(|e| AppError::Internal(format!("SMTP transport: {e}")))?,
            ),
            None => {
                info!("SMTP not configured, outbound email disabled");
                None
            }
        };

        let translator = match &config.translate {
            Some(translate_config) => Some(
                TranslationClient::new(translate_config)
                    .map_err(|e| AppError::Internal(format!("translation client: {e}")))?,
            ),
            None => {
                info!("translation API not configured, /translate disabled");
                None
            }
        };

        let reset_tokens = ResetTokenService::new(&config.session_secret);
        let response_cache = ResponseCache::new(&config.cache);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                email,
                translator,
                reset_tokens,
                response_cache,
            }),
        })
    }

    /// Get a reference to the application configuration.
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get the email service, if SMTP is configured.
    #[must_use]
    pub fn email(&self) -> Option<&EmailService> {
        self.inner.email.as_ref()
    }

    /// Get the translation client, if configured.
    #[must_use]
    pub fn translator(&self) -> Option<&TranslationClient> {
        self.inner.translator.as_ref()
    }

    /// Get the password-reset token service.
    #[must_use]
    pub fn reset_tokens(&self) -> &ResetTokenService {
        &self.inner.reset_tokens
    }

    /// Get the response cache handle.
    #[must_use]
    pub fn response_cache(&self) -> &ResponseCache {
        &self.inner.response_cache
    }
}
