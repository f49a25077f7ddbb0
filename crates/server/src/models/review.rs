//! Artwork review models.

use atelier_core::{ArtworkId, ReviewId, UserId};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// A review row joined with the reviewer's display name.
///
/// Public listings only ever contain approved, non-removed reviews; the
/// `approved` flag matters for the admin moderation queue.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Review {
    pub id: ReviewId,
    pub user_id: UserId,
    pub artwork_id: ArtworkId,
    pub reviewer_name: String,
    pub body: String,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
}
