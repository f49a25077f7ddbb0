//! Password authentication.
//!
//! Registration, login verification, and password updates. Passwords are
//! hashed with Argon2id; hashes never leave this module.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;
use thiserror::Error;

use atelier_core::{Email, EmailError};

use crate::db::{RepositoryError, UserRepository, users::NewUser};
use crate::models::User;

const MIN_PASSWORD_LENGTH: usize = 8;

/// Errors from authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email or password did not match an account.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Registration against an email that already has an account.
    #[error("An account with this email already exists")]
    EmailTaken,

    /// Email failed validation.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Password too short.
    #[error("Password must be at least {MIN_PASSWORD_LENGTH} characters")]
    WeakPassword,

    /// Hashing failure.
    #[error("Password hashing failed")]
    PasswordHash,

    /// Underlying repository failure.
    #[error(transparent)]
    Repository(RepositoryError),
}

impl From<RepositoryError> for AuthError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(_) => Self::EmailTaken,
            other => Self::Repository(other),
        }
    }
}

/// Input for registering a new account.
#[derive(Debug)]
pub struct Registration {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub address: Option<String>,
    pub phone: Option<String>,
}

/// Register a new user.
///
/// # Errors
///
/// Returns [`AuthError::EmailTaken`] when the email already has an
/// account, [`AuthError::InvalidEmail`] or [`AuthError::WeakPassword`]
/// on validation failure.
pub async fn register(pool: &PgPool, input: Registration) -> Result<User, AuthError> {
    let email = Email::parse(&input.email)?;
    validate_password(&input.password)?;

    let password_hash = hash_password(&input.password)?;
    let new = NewUser {
        first_name: input.first_name,
        last_name: input.last_name,
        email,
        address: input.address,
        phone: input.phone,
    };

    let user = UserRepository::new(pool).create(&new, &password_hash).await?;
    Ok(user)
}

/// Verify credentials and return the account.
///
/// Unknown email and wrong password both map to
/// [`AuthError::InvalidCredentials`].
///
/// # Errors
///
/// Returns [`AuthError::InvalidCredentials`] on any mismatch.
pub async fn authenticate(pool: &PgPool, email: &str, password: &str) -> Result<User, AuthError> {
    let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

    let Some((user, hash)) = UserRepository::new(pool)
        .get_with_password_hash(&email)
        .await?
    else {
        return Err(AuthError::InvalidCredentials);
    };

    verify_password(password, &hash)?;
    Ok(user)
}

/// Replace the password of the account with this email.
///
/// # Errors
///
/// Returns [`AuthError::WeakPassword`] on validation failure and
/// propagates `NotFound` from the repository when no account matches.
pub async fn set_password(pool: &PgPool, email: &Email, password: &str) -> Result<(), AuthError> {
    validate_password(password)?;
    let password_hash = hash_password(password)?;
    UserRepository::new(pool)
        .update_password(email, &password_hash)
        .await?;
    Ok(())
}

/// Change a password after verifying the current one.
///
/// # Errors
///
/// Returns [`AuthError::InvalidCredentials`] when the current password
/// does not match.
pub async fn change_password(
    pool: &PgPool,
    email: &Email,
    current_password: &str,
    new_password: &str,
) -> Result<(), AuthError> {
    let Some((_, hash)) = UserRepository::new(pool)
        .get_with_password_hash(email)
        .await?
    else {
        return Err(AuthError::InvalidCredentials);
    };
    verify_password(current_password, &hash)?;

    set_password(pool, email, new_password).await
}

fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword);
    }
    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(verify_password("correct horse battery", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong password", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_short_passwords_rejected() {
        assert!(matches!(
            validate_password("short"),
            Err(AuthError::WeakPassword)
        ));
        assert!(validate_password("long enough").is_ok());
    }

    #[test]
    fn test_garbage_hash_is_invalid_credentials() {
        assert!(matches!(
            verify_password("anything", "not-a-phc-string"),
            Err(AuthError::InvalidCredentials)
        ));
    }
}
