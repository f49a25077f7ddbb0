//! Public catalog route handlers.
//!
//! All listings return [`ArtworkSummary`] values: the raw rows enriched
//! with tag names (one batched query per page) and the thumbnail path
//! read from the media directory.

use axum::{Json, extract::{Query, State}};
use serde::Deserialize;
use tracing::instrument;

use atelier_core::ArtworkId;

use crate::db::{ArtworkRepository, CategoryRepository, ReviewRepository};
use crate::error::{AppError, Result};
use crate::media;
use crate::models::{
    Artwork, ArtworkFilter, ArtworkSummary, Category, DEFAULT_PAGE_SIZE, Review,
};
use crate::state::AppState;

/// Query for the fixed-size listings (`/featured`, `/newest`, ...).
#[derive(Debug, Deserialize)]
pub struct CountQuery {
    pub n: Option<i64>,
}

impl CountQuery {
    fn limit(&self) -> i64 {
        self.n.unwrap_or(DEFAULT_PAGE_SIZE).max(1)
    }
}

/// Query selecting a single artwork.
#[derive(Debug, Deserialize)]
pub struct IdQuery {
    pub id: ArtworkId,
}

/// List all categories.
///
/// GET /categories
pub async fn categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    let rows = CategoryRepository::new(state.pool()).list().await?;
    Ok(Json(rows))
}

/// Search the catalog.
///
/// GET /search_artworks
#[instrument(skip(state))]
pub async fn search_artworks(
    State(state): State<AppState>,
    Query(filter): Query<ArtworkFilter>,
) -> Result<Json<Vec<ArtworkSummary>>> {
    let rows = ArtworkRepository::new(state.pool()).search(&filter).await?;
    let enriched = enrich_artworks(&state, rows).await?;
    Ok(Json(enriched))
}

/// Currently featured artworks, most recently featured first.
///
/// GET /featured
pub async fn featured(
    State(state): State<AppState>,
    Query(query): Query<CountQuery>,
) -> Result<Json<Vec<ArtworkSummary>>> {
    let rows = ArtworkRepository::new(state.pool())
        .featured(query.limit())
        .await?;
    let enriched = enrich_artworks(&state, rows).await?;
    Ok(Json(enriched))
}

/// Newest artworks.
///
/// GET /newest
pub async fn newest(
    State(state): State<AppState>,
    Query(query): Query<CountQuery>,
) -> Result<Json<Vec<ArtworkSummary>>> {
    let rows = ArtworkRepository::new(state.pool())
        .newest(query.limit())
        .await?;
    let enriched = enrich_artworks(&state, rows).await?;
    Ok(Json(enriched))
}

/// Most wishlisted artworks.
///
/// GET /most_wishlisted
pub async fn most_wishlisted(
    State(state): State<AppState>,
    Query(query): Query<CountQuery>,
) -> Result<Json<Vec<ArtworkSummary>>> {
    let rows = ArtworkRepository::new(state.pool())
        .most_wishlisted(query.limit())
        .await?;
    let enriched = enrich_artworks(&state, rows).await?;
    Ok(Json(enriched))
}

/// A single artwork.
///
/// GET /artwork?id=...
pub async fn artwork(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> Result<Json<ArtworkSummary>> {
    let row = ArtworkRepository::new(state.pool())
        .get(query.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("artwork {}", query.id)))?;

    let mut enriched = enrich_artworks(&state, vec![row]).await?;
    // One input row always yields one summary.
    enriched
        .pop()
        .map(Json)
        .ok_or_else(|| AppError::Internal("artwork enrichment dropped a row".to_string()))
}

/// Approved reviews for an artwork, newest first.
///
/// GET /reviews?id=...
pub async fn reviews(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> Result<Json<Vec<Review>>> {
    let rows = ReviewRepository::new(state.pool())
        .approved_for_artwork(query.id)
        .await?;
    Ok(Json(rows))
}

/// Attach tags and thumbnails to a page of artwork rows.
///
/// Tags come from one batched query over the whole page; thumbnails are
/// read from the media directory per artwork.
pub async fn enrich_artworks(
    state: &AppState,
    rows: Vec<Artwork>,
) -> Result<Vec<ArtworkSummary>> {
    let ids: Vec<ArtworkId> = rows.iter().map(|a| a.id).collect();
    let mut tags = ArtworkRepository::new(state.pool()).tags_for(&ids).await?;

    let media_root = &state.config().media_root;
    let mut enriched = Vec::with_capacity(rows.len());
    for artwork in rows {
        let thumbnail = media::thumbnail_path(media_root, artwork.id).await;
        let artwork_tags = tags.remove(&artwork.id).unwrap_or_default();
        enriched.push(ArtworkSummary::from_parts(artwork, thumbnail, artwork_tags));
    }
    Ok(enriched)
}
