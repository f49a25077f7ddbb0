//! Review repository: submission and moderation.

use atelier_core::{ArtworkId, ReviewId, UserId};
use sqlx::PgPool;

use super::RepositoryError;
use crate::models::review::Review;

/// Columns selected for review queries, with the reviewer's display name.
const REVIEW_COLUMNS: &str = "r.id, r.user_id, r.artwork_id, \
     u.first_name || ' ' || u.last_name AS reviewer_name, \
     r.body, r.approved, r.created_at";

/// Repository for review operations.
pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Submit a review; it enters the moderation queue unapproved.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        user_id: UserId,
        artwork_id: ArtworkId,
        body: &str,
    ) -> Result<ReviewId, RepositoryError> {
        let id = sqlx::query_scalar::<_, ReviewId>(
            "INSERT INTO review (user_id, artwork_id, body) \
             VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(user_id)
        .bind(artwork_id)
        .bind(body)
        .fetch_one(self.pool)
        .await?;
        Ok(id)
    }

    /// Approved, non-removed reviews for an artwork, newest first.
    ///
    /// This is the only review listing visible to the public.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn approved_for_artwork(
        &self,
        artwork_id: ArtworkId,
    ) -> Result<Vec<Review>, RepositoryError> {
        let rows = sqlx::query_as::<_, Review>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM review r \
             JOIN site_user u ON u.id = r.user_id \
             WHERE r.artwork_id = $1 AND r.approved AND NOT r.removed \
             ORDER BY r.created_at DESC"
        ))
        .bind(artwork_id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Reviews awaiting moderation, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn pending(&self) -> Result<Vec<Review>, RepositoryError> {
        let rows = sqlx::query_as::<_, Review>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM review r \
             JOIN site_user u ON u.id = r.user_id \
             WHERE NOT r.approved AND NOT r.removed \
             ORDER BY r.created_at"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Approve a pending review.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no non-removed review matches.
    pub async fn approve(&self, id: ReviewId) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE review SET approved = TRUE WHERE id = $1 AND NOT removed")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Soft-remove a review (rejection or takedown).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no non-removed review matches.
    pub async fn soft_remove(&self, id: ReviewId) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE review SET removed = TRUE WHERE id = $1 AND NOT removed")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
