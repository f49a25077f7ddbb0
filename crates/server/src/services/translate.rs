//! Client for the third-party translation API.
//!
//! The server never exposes the API key to browsers; clients call
//! `/translate` and this client forwards the request upstream. Results
//! are cached in the `translation` table by the route handler, so the
//! upstream service is only hit for text it has not seen before.

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::TranslateConfig;

/// Errors that can occur when calling the translation API.
#[derive(Debug, Error)]
pub enum TranslationError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Unauthorized (invalid API key).
    #[error("Unauthorized: invalid API key")]
    Unauthorized,

    /// Failed to build the client or parse a response.
    #[error("Parse error: {0}")]
    Parse(String),
}

#[derive(Serialize)]
struct TranslateRequest<'a> {
    text: &'a str,
    target_language: &'a str,
}

#[derive(Deserialize)]
struct TranslateResponse {
    translation: String,
}

/// Translation API client.
#[derive(Clone)]
pub struct TranslationClient {
    inner: Arc<TranslationClientInner>,
}

struct TranslationClientInner {
    client: reqwest::Client,
    api_url: String,
}

impl TranslationClient {
    /// Create a new translation API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &TranslateConfig) -> Result<Self, TranslationError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "Authorization",
            bearer_header(&config.api_key)
                .map_err(|e| TranslationError::Parse(format!("Invalid API key format: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            inner: Arc::new(TranslationClientInner {
                client,
                api_url: config.api_url.clone(),
            }),
        })
    }

    /// Translate a piece of text into the target language.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the API rejects it.
    pub async fn translate(
        &self,
        text: &str,
        target_language: &str,
    ) -> Result<String, TranslationError> {
        let body = TranslateRequest {
            text,
            target_language,
        };
        let response = self
            .inner
            .client
            .post(&self.inner.api_url)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let parsed: TranslateResponse = response
                .json()
                .await
                .map_err(|e| TranslationError::Parse(format!("Failed to parse response: {e}")))?;
            return Ok(parsed.translation);
        }

        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(TranslationError::Unauthorized);
        }

        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(TranslationError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

fn bearer_header(key: &SecretString) -> Result<HeaderValue, reqwest::header::InvalidHeaderValue> {
    let mut value = HeaderValue::from_str(&format!("Bearer {}", key.expose_secret()))?;
    value.set_sensitive(true);
    Ok(value)
}

impl std::fmt::Debug for TranslationClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslationClient")
            .field("api_url", &self.inner.api_url)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_header_is_sensitive() {
        let value = bearer_header(&SecretString::from("k-123")).unwrap();
        assert!(value.is_sensitive());
        assert_eq!(value.to_str().unwrap(), "Bearer k-123");
    }

    #[test]
    fn test_request_body_shape() {
        let body = TranslateRequest {
            text: "hello",
            target_language: "fi",
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["text"], "hello");
        assert_eq!(json["target_language"], "fi");
    }
}
