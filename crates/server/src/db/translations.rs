//! Translation cache repository.
//!
//! Stores results from the external translation API so repeated requests for
//! the same text and target language never leave the database.

use sqlx::PgPool;

use super::RepositoryError;

/// Repository for cached translations.
pub struct TranslationRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TranslationRepository<'a> {
    /// Create a new translation repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Look up a cached translation.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find(
        &self,
        source_text: &str,
        target_language: &str,
    ) -> Result<Option<String>, RepositoryError> {
        let row = sqlx::query_scalar::<_, String>(
            "SELECT translated_text FROM translation \
             WHERE source_text = $1 AND target_language = $2",
        )
        .bind(source_text)
        .bind(target_language)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// Store a translation result; concurrent stores of the same pair keep
    /// the latest text.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    pub async fn store(
        &self,
        source_text: &str,
        target_language: &str,
        translated_text: &str,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO translation (source_text, target_language, translated_text) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (source_text, target_language) \
             DO UPDATE SET translated_text = EXCLUDED.translated_text",
        )
        .bind(source_text)
        .bind(target_language)
        .bind(translated_text)
        .execute(self.pool)
        .await?;
        Ok(())
    }
}
