//! Admin rights management.
//!
//! Accounts register through the API; the first admin is promoted here.

use super::CliError;

/// Set or clear the admin flag on the account with this email.
pub async fn set_admin(email: &str, is_admin: bool) -> Result<(), CliError> {
    let pool = super::connect().await?;

    let email = email.trim().to_lowercase();
    let result = sqlx::query(
        "UPDATE site_user SET is_admin = $2, updated_at = NOW() \
         WHERE email = $1 AND NOT removed",
    )
    .bind(&email)
    .bind(is_admin)
    .execute(&pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(CliError::UnknownAccount(email));
    }

    tracing::info!(%email, is_admin, "admin flag updated");
    Ok(())
}
