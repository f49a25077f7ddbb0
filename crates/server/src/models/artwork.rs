//! Artwork catalog models and search filter types.

use atelier_core::{ArtworkId, CategoryId, Price};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Default page size for catalog listings when `n` is absent.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// An artwork row joined with its category name.
#[derive(Debug, Clone, FromRow)]
pub struct Artwork {
    pub id: ArtworkId,
    pub title: String,
    pub artist_name: String,
    pub price: Price,
    pub quantity: i32,
    pub category_id: Option<CategoryId>,
    pub category_name: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An artwork enriched with its thumbnail path and active tags,
/// as returned to clients.
#[derive(Debug, Clone, Serialize)]
pub struct ArtworkSummary {
    pub id: ArtworkId,
    pub title: String,
    pub artist_name: String,
    pub price: Price,
    pub quantity: i32,
    pub category_id: Option<CategoryId>,
    pub category_name: Option<String>,
    pub description: Option<String>,
    /// Relative path under the media root, empty when no image exists.
    pub thumbnail: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl ArtworkSummary {
    /// Combine an artwork row with its enrichment data.
    #[must_use]
    pub fn from_parts(artwork: Artwork, thumbnail: String, tags: Vec<String>) -> Self {
        Self {
            id: artwork.id,
            title: artwork.title,
            artist_name: artwork.artist_name,
            price: artwork.price,
            quantity: artwork.quantity,
            category_id: artwork.category_id,
            category_name: artwork.category_name,
            description: artwork.description,
            thumbnail,
            tags,
            created_at: artwork.created_at,
        }
    }
}

/// A category row.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// Sort direction for catalog search, by creation date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// The SQL keyword for this direction.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Optional filters for artwork search, combined with AND.
///
/// Mirrors the `GET /search_artworks` query string. Price bounds are
/// inclusive; title and artist match case-insensitive substrings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArtworkFilter {
    /// Minimum price, inclusive.
    pub min: Option<Decimal>,
    /// Maximum price, inclusive.
    pub max: Option<Decimal>,
    /// Case-insensitive substring of the title.
    pub title: Option<String>,
    /// Case-insensitive substring of the artist name.
    pub artist_name: Option<String>,
    /// Exact category match.
    pub category_id: Option<CategoryId>,
    /// Restrict to currently featured artworks.
    #[serde(default)]
    pub only_featured: bool,
    /// Sort direction by creation date (default: newest first).
    pub order: Option<SortOrder>,
    /// Page size (default [`DEFAULT_PAGE_SIZE`]).
    pub n: Option<i64>,
    /// Row offset into the result set.
    pub offset: Option<i64>,
}

impl ArtworkFilter {
    /// Effective page size, clamped to at least one row.
    #[must_use]
    pub fn limit(&self) -> i64 {
        self.n.unwrap_or(DEFAULT_PAGE_SIZE).max(1)
    }

    /// Effective offset, never negative.
    #[must_use]
    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_page_size() {
        let filter = ArtworkFilter::default();
        assert_eq!(filter.limit(), 10);
        assert_eq!(filter.offset(), 0);
    }

    #[test]
    fn test_limit_and_offset_clamped() {
        let filter = ArtworkFilter {
            n: Some(0),
            offset: Some(-5),
            ..ArtworkFilter::default()
        };
        assert_eq!(filter.limit(), 1);
        assert_eq!(filter.offset(), 0);
    }

    #[test]
    fn test_sort_order_deserializes_lowercase() {
        let order: SortOrder = serde_json::from_str("\"asc\"").unwrap();
        assert_eq!(order, SortOrder::Asc);
        assert_eq!(order.as_sql(), "ASC");
    }

    #[test]
    fn test_filter_from_query_shape() {
        let json = serde_json::json!({
            "min": "10",
            "max": "250.50",
            "title": "sun",
            "only_featured": true,
            "order": "desc"
        });
        let filter: ArtworkFilter = serde_json::from_value(json).unwrap();
        assert!(filter.only_featured);
        assert_eq!(filter.title.as_deref(), Some("sun"));
        assert_eq!(filter.order, Some(SortOrder::Desc));
    }
}
