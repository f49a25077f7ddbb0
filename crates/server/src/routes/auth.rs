//! Session and password route handlers.
//!
//! Login puts a [`CurrentUser`] into the server-side session; the cookie
//! carries only the session id. Password reset is a signed, self-contained
//! token mailed to the account holder.

use axum::{
    Json,
    extract::State,
    http::HeaderMap,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use tower_sessions::Session;
use tracing::{info, instrument};

use atelier_core::Email;

use crate::db::UserRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::middleware::auth::{clear_current_user, set_current_user};
use crate::models::{CurrentUser, PublicUser};
use crate::services::{EmailService, auth};
use crate::state::AppState;

/// Header carrying the password-reset token.
pub const RESET_TOKEN_HEADER: &str = "x-reset-token";

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Forgot password form data.
#[derive(Debug, Deserialize)]
pub struct ForgotPasswordForm {
    pub email: String,
}

/// Reset password form data.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordForm {
    pub email: String,
    pub new_password: String,
}

/// Handle login.
///
/// POST /login
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<LoginForm>,
) -> Result<Json<PublicUser>> {
    let user = auth::authenticate(state.pool(), &form.email, &form.password).await?;

    set_current_user(&session, &CurrentUser::from(&user))
        .await
        .map_err(|e| AppError::Internal(format!("session write: {e}")))?;

    info!(user_id = %user.id, "user logged in");
    Ok(Json(PublicUser::from(user)))
}

/// Return the logged-in user, freshly loaded.
///
/// GET /logged_in
pub async fn logged_in(
    State(state): State<AppState>,
    RequireUser(current): RequireUser,
) -> Result<Json<PublicUser>> {
    let user = UserRepository::new(state.pool())
        .get_by_id(current.id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("account no longer exists".to_string()))?;
    Ok(Json(PublicUser::from(user)))
}

/// Destroy the session.
///
/// GET /log_out
pub async fn log_out(session: Session) -> Result<impl IntoResponse> {
    clear_current_user(&session)
        .await
        .map_err(|e| AppError::Internal(format!("session write: {e}")))?;
    session
        .flush()
        .await
        .map_err(|e| AppError::Internal(format!("session flush: {e}")))?;
    Ok(Json(json!({ "success": true })))
}

/// Start a password reset.
///
/// POST /forgot_password
///
/// Always answers 200 so the endpoint cannot be used to probe which
/// emails have accounts. The mail is sent fire-and-forget.
#[instrument(skip(state, form), fields(email = %form.email))]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(form): Json<ForgotPasswordForm>,
) -> Result<impl IntoResponse> {
    let accepted = Json(json!({ "success": true }));

    let Ok(email) = Email::parse(&form.email) else {
        return Ok(accepted);
    };
    let Some(email_service) = state.email() else {
        info!("password reset requested but email is not configured");
        return Ok(accepted);
    };

    let known = UserRepository::new(state.pool())
        .get_by_email(&email)
        .await?
        .is_some();
    if !known {
        return Ok(accepted);
    }

    let token = state.reset_tokens().issue(email.as_str());
    let reset_link = format!(
        "{}/reset_password?token={token}",
        state.config().client_origin
    );

    let service = email_service.clone();
    let to = email.as_str().to_owned();
    EmailService::send_spawned(
        async move { service.send_password_reset(&to, &reset_link).await },
        "password reset email",
    );

    Ok(accepted)
}

/// Finish a password reset.
///
/// POST /reset_password
///
/// Requires a valid `x-reset-token` header whose embedded email matches
/// the body email.
#[instrument(skip_all, fields(email = %form.email))]
pub async fn reset_password(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(form): Json<ResetPasswordForm>,
) -> Result<impl IntoResponse> {
    let token = headers
        .get(RESET_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("missing reset token".to_string()))?;

    let claimed_email = state.reset_tokens().verify(token)?;
    if !claimed_email.eq_ignore_ascii_case(form.email.trim()) {
        return Err(AppError::Unauthorized(
            "reset token does not match this account".to_string(),
        ));
    }

    let email =
        Email::parse(&claimed_email).map_err(|e| AppError::BadRequest(e.to_string()))?;
    auth::set_password(state.pool(), &email, &form.new_password).await?;

    info!("password reset completed");
    Ok(Json(json!({ "success": true })))
}
