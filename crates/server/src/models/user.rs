//! User account models and session types.

use atelier_core::{Email, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Session storage keys.
pub mod session_keys {
    /// Key under which the logged-in user is stored in the session.
    pub const CURRENT_USER: &str = "current_user";
}

/// A user account row.
///
/// The password hash is deliberately not part of this struct; queries that
/// need it return it alongside (see `UserRepository::get_password_hash`).
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public view of a user, safe to return to clients.
#[derive(Debug, Clone, Serialize)]
pub struct PublicUser {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub is_admin: bool,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            address: user.address,
            phone: user.phone,
            is_admin: user.is_admin,
        }
    }
}

/// The logged-in user as stored in the server-side session.
///
/// The cookie carries only the session id; this struct lives in the session
/// store and is what the auth extractors read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_admin: bool,
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.as_str().to_owned(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            is_admin: user.is_admin,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: UserId::new(3),
            first_name: "Ada".to_owned(),
            last_name: "Vermeer".to_owned(),
            email: Email::parse("ada@example.com").unwrap(),
            address: Some("1 Canal St".to_owned()),
            phone: None,
            is_admin: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_public_user_has_no_password_field() {
        let public = PublicUser::from(sample_user());
        let json = serde_json::to_value(&public).unwrap();
        assert!(json.get("password").is_none());
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["email"], "ada@example.com");
    }

    #[test]
    fn test_current_user_from_user() {
        let user = sample_user();
        let current = CurrentUser::from(&user);
        assert_eq!(current.id, user.id);
        assert!(!current.is_admin);
    }
}
