//! Category repository.

use sqlx::PgPool;

use super::RepositoryError;
use crate::models::artwork::Category;

/// Repository for category operations.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All non-removed categories, alphabetically.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query_as::<_, Category>(
            "SELECT id, name FROM category WHERE NOT removed ORDER BY name",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }
}
