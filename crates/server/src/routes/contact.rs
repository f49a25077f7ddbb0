//! Contact form route handlers.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use atelier_core::Email;

use crate::db::MessageRepository;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Contact form data.
#[derive(Debug, Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
}

/// Response for form submission.
#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub success: bool,
}

/// Submit a message to the administrators.
///
/// POST /message_to_administrator
///
/// The message lands in the admin inbox; replies go out by email from
/// the admin surface.
#[instrument(skip(state, form), fields(email = %form.email))]
pub async fn message_to_administrator(
    State(state): State<AppState>,
    Json(form): Json<ContactForm>,
) -> Result<impl IntoResponse> {
    let email = Email::parse(&form.email)
        .map_err(|_| AppError::BadRequest("Please enter a valid email address.".to_string()))?;

    let name = form.name.trim();
    let message = form.message.trim();
    if name.is_empty() || message.is_empty() {
        return Err(AppError::BadRequest(
            "Name and message are required.".to_string(),
        ));
    }

    let id = MessageRepository::new(state.pool())
        .create(name, email.as_str(), message)
        .await?;

    tracing::info!(message_id = %id, "contact message received");
    Ok((StatusCode::OK, Json(ContactResponse { success: true })))
}
