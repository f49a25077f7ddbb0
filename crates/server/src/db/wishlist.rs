//! Wishlist repository.

use atelier_core::{ArtworkId, UserId};
use sqlx::PgPool;

use super::RepositoryError;
use crate::models::artwork::Artwork;

/// Repository for wishlist operations.
pub struct WishlistRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> WishlistRepository<'a> {
    /// Create a new wishlist repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The user's wishlisted artworks, most recently added first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<Artwork>, RepositoryError> {
        let rows = sqlx::query_as::<_, Artwork>(
            "SELECT a.id, a.title, a.artist_name, a.price, a.quantity, \
                    a.category_id, c.name AS category_name, a.description, \
                    a.created_at, a.updated_at \
             FROM wishlisted w \
             JOIN artwork a ON a.id = w.artwork_id AND NOT a.removed \
             LEFT JOIN category c ON c.id = a.category_id \
             WHERE w.user_id = $1 AND NOT w.removed \
             ORDER BY w.created_at DESC",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Add an artwork to the wishlist; re-adding refreshes the timestamp.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    pub async fn add(&self, user_id: UserId, artwork_id: ArtworkId) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO wishlisted (user_id, artwork_id) VALUES ($1, $2) \
             ON CONFLICT (user_id, artwork_id) \
             DO UPDATE SET removed = FALSE, created_at = NOW()",
        )
        .bind(user_id)
        .bind(artwork_id)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Soft-remove a wishlist entry; removing an absent entry is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    pub async fn remove(
        &self,
        user_id: UserId,
        artwork_id: ArtworkId,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "UPDATE wishlisted SET removed = TRUE \
             WHERE user_id = $1 AND artwork_id = $2",
        )
        .bind(user_id)
        .bind(artwork_id)
        .execute(self.pool)
        .await?;
        Ok(())
    }
}
