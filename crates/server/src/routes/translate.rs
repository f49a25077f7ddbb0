//! Translation passthrough route handler.
//!
//! Results are cached in the `translation` table, so each distinct
//! (text, language) pair hits the upstream API once.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::db::TranslationRepository;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Translation request body.
#[derive(Debug, Deserialize)]
pub struct TranslateRequest {
    pub text: String,
    pub target_language: String,
}

/// Translation response body.
#[derive(Debug, Serialize)]
pub struct TranslateResponse {
    pub translation: String,
}

/// Translate a piece of text.
///
/// POST /translate
///
/// Answers 503 when no translation API is configured.
#[instrument(skip(state, request), fields(target = %request.target_language))]
pub async fn translate(
    State(state): State<AppState>,
    Json(request): Json<TranslateRequest>,
) -> Result<Json<TranslateResponse>> {
    let text = request.text.trim();
    let target = request.target_language.trim();
    if text.is_empty() || target.is_empty() {
        return Err(AppError::BadRequest(
            "text and target_language are required".to_string(),
        ));
    }

    let repo = TranslationRepository::new(state.pool());
    if let Some(cached) = repo.find(text, target).await? {
        debug!("translation served from cache");
        return Ok(Json(TranslateResponse {
            translation: cached,
        }));
    }

    let client = state
        .translator()
        .ok_or_else(|| AppError::Unavailable("translation is not configured".to_string()))?;
    let translation = client.translate(text, target).await?;

    repo.store(text, target, &translation).await?;
    Ok(Json(TranslateResponse { translation }))
}
