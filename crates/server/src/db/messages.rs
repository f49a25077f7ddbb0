//! Contact-form message repository.

use atelier_core::MessageId;
use sqlx::PgPool;

use super::RepositoryError;
use crate::models::message::AdminMessage;

const MESSAGE_COLUMNS: &str = "id, name, email, body, answered, created_at";

/// Repository for contact-form messages addressed to the administrators.
pub struct MessageRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> MessageRepository<'a> {
    /// Create a new message repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Store an incoming contact-form message.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        name: &str,
        email: &str,
        body: &str,
    ) -> Result<MessageId, RepositoryError> {
        let id = sqlx::query_scalar::<_, MessageId>(
            "INSERT INTO admin_message (name, email, body) \
             VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(name)
        .bind(email)
        .bind(body)
        .fetch_one(self.pool)
        .await?;
        Ok(id)
    }

    /// All non-removed messages, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<AdminMessage>, RepositoryError> {
        let rows = sqlx::query_as::<_, AdminMessage>(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM admin_message \
             WHERE NOT removed ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Get a single non-removed message.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: MessageId) -> Result<Option<AdminMessage>, RepositoryError> {
        let row = sqlx::query_as::<_, AdminMessage>(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM admin_message WHERE id = $1 AND NOT removed"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// Mark a message as answered.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no non-removed message matches.
    pub async fn mark_answered(&self, id: MessageId) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE admin_message SET answered = TRUE WHERE id = $1 AND NOT removed")
                .bind(id)
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
