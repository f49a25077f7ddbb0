//! Artwork repository: catalog search, listings, and admin mutations.
//!
//! The search query is composed with `sqlx::QueryBuilder` so every filter
//! value travels as a bind parameter; filter fragments are appended
//! conditionally onto a fixed `WHERE NOT a.removed` base.

use std::collections::HashMap;

use atelier_core::{ArtworkId, CategoryId, Price};
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::RepositoryError;
use crate::models::artwork::{Artwork, ArtworkFilter};

/// Columns selected for every artwork query, joined with the category name.
const ARTWORK_COLUMNS: &str = "a.id, a.title, a.artist_name, a.price, a.quantity, \
     a.category_id, c.name AS category_name, a.description, a.created_at, a.updated_at";

/// Fields for creating an artwork.
#[derive(Debug, Clone)]
pub struct NewArtwork {
    pub title: String,
    pub artist_name: String,
    pub price: Price,
    pub quantity: i32,
    pub category_id: Option<CategoryId>,
    pub description: Option<String>,
}

/// Optional fields for updating an artwork; `None` leaves a column untouched.
#[derive(Debug, Clone, Default)]
pub struct ArtworkUpdate {
    pub title: Option<String>,
    pub artist_name: Option<String>,
    pub price: Option<Price>,
    pub quantity: Option<i32>,
    pub category_id: Option<CategoryId>,
    pub description: Option<String>,
}

/// Repository for artwork catalog operations.
pub struct ArtworkRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ArtworkRepository<'a> {
    /// Create a new artwork repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Search the catalog with the given optional filters.
    ///
    /// Only non-removed artworks are returned. Ordering is by creation date,
    /// pagination via LIMIT/OFFSET with a default page size of 10.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search(&self, filter: &ArtworkFilter) -> Result<Vec<Artwork>, RepositoryError> {
        let mut qb = build_search_query(filter);
        let rows = qb
            .build_query_as::<Artwork>()
            .fetch_all(self.pool)
            .await?;
        Ok(rows)
    }

    /// Get a single non-removed artwork by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ArtworkId) -> Result<Option<Artwork>, RepositoryError> {
        let row = sqlx::query_as::<_, Artwork>(&format!(
            "SELECT {ARTWORK_COLUMNS} FROM artwork a \
             LEFT JOIN category c ON c.id = a.category_id \
             WHERE a.id = $1 AND NOT a.removed"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// The `n` most recently added artworks.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn newest(&self, n: i64) -> Result<Vec<Artwork>, RepositoryError> {
        let rows = sqlx::query_as::<_, Artwork>(&format!(
            "SELECT {ARTWORK_COLUMNS} FROM artwork a \
             LEFT JOIN category c ON c.id = a.category_id \
             WHERE NOT a.removed \
             ORDER BY a.created_at DESC LIMIT $1"
        ))
        .bind(n)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// The `n` most recently featured artworks.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn featured(&self, n: i64) -> Result<Vec<Artwork>, RepositoryError> {
        let rows = sqlx::query_as::<_, Artwork>(&format!(
            "SELECT {ARTWORK_COLUMNS} FROM artwork a \
             JOIN featured f ON f.artwork_id = a.id AND NOT f.removed \
             LEFT JOIN category c ON c.id = a.category_id \
             WHERE NOT a.removed \
             ORDER BY f.created_at DESC LIMIT $1"
        ))
        .bind(n)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// The `n` artworks appearing on the most wishlists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn most_wishlisted(&self, n: i64) -> Result<Vec<Artwork>, RepositoryError> {
        let rows = sqlx::query_as::<_, Artwork>(&format!(
            "SELECT {ARTWORK_COLUMNS} FROM artwork a \
             JOIN (SELECT artwork_id, COUNT(*) AS wish_count \
                   FROM wishlisted WHERE NOT removed GROUP BY artwork_id) w \
               ON w.artwork_id = a.id \
             LEFT JOIN category c ON c.id = a.category_id \
             WHERE NOT a.removed \
             ORDER BY w.wish_count DESC, a.created_at DESC LIMIT $1"
        ))
        .bind(n)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Active (non-removed) tag names for a set of artworks, one query for
    /// the whole page.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn tags_for(
        &self,
        ids: &[ArtworkId],
    ) -> Result<HashMap<ArtworkId, Vec<String>>, RepositoryError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let raw_ids: Vec<i32> = ids.iter().map(|id| id.as_i32()).collect();
        let rows = sqlx::query_as::<_, (i32, String)>(
            "SELECT at.artwork_id, t.name FROM artwork_tag at \
             JOIN tag t ON t.id = at.tag_id \
             WHERE NOT at.removed AND at.artwork_id = ANY($1) \
             ORDER BY t.name",
        )
        .bind(&raw_ids)
        .fetch_all(self.pool)
        .await?;

        let mut by_artwork: HashMap<ArtworkId, Vec<String>> = HashMap::new();
        for (artwork_id, name) in rows {
            by_artwork
                .entry(ArtworkId::new(artwork_id))
                .or_default()
                .push(name);
        }
        Ok(by_artwork)
    }

    /// Insert a new artwork and return it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, new: &NewArtwork) -> Result<Artwork, RepositoryError> {
        let id = sqlx::query_scalar::<_, ArtworkId>(
            "INSERT INTO artwork (title, artist_name, price, quantity, category_id, description) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
        )
        .bind(&new.title)
        .bind(&new.artist_name)
        .bind(new.price)
        .bind(new.quantity)
        .bind(new.category_id)
        .bind(&new.description)
        .fetch_one(self.pool)
        .await?;

        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Update an artwork's fields; absent fields keep their current value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no non-removed artwork matches.
    pub async fn update(
        &self,
        id: ArtworkId,
        update: &ArtworkUpdate,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE artwork SET \
                title = COALESCE($2, title), \
                artist_name = COALESCE($3, artist_name), \
                price = COALESCE($4, price), \
                quantity = COALESCE($5, quantity), \
                category_id = COALESCE($6, category_id), \
                description = COALESCE($7, description), \
                updated_at = NOW() \
             WHERE id = $1 AND NOT removed",
        )
        .bind(id)
        .bind(&update.title)
        .bind(&update.artist_name)
        .bind(update.price)
        .bind(update.quantity)
        .bind(update.category_id)
        .bind(&update.description)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Soft-remove an artwork.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no non-removed artwork matches.
    pub async fn soft_remove(&self, id: ArtworkId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE artwork SET removed = TRUE, updated_at = NOW() \
             WHERE id = $1 AND NOT removed",
        )
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Mark an artwork as featured, or clear the flag.
    ///
    /// Re-featuring refreshes the timestamp used for "most recently
    /// featured" ordering.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    pub async fn set_featured(&self, id: ArtworkId, featured: bool) -> Result<(), RepositoryError> {
        if featured {
            sqlx::query(
                "INSERT INTO featured (artwork_id) VALUES ($1) \
                 ON CONFLICT (artwork_id) \
                 DO UPDATE SET removed = FALSE, created_at = NOW()",
            )
            .bind(id)
            .execute(self.pool)
            .await?;
        } else {
            sqlx::query("UPDATE featured SET removed = TRUE WHERE artwork_id = $1")
                .bind(id)
                .execute(self.pool)
                .await?;
        }
        Ok(())
    }
}

/// Compose the search query from the filter's present fields.
fn build_search_query(filter: &ArtworkFilter) -> QueryBuilder<'_, Postgres> {
    let mut qb: QueryBuilder<'_, Postgres> = QueryBuilder::new(format!(
        "SELECT {ARTWORK_COLUMNS} FROM artwork a "
    ));

    if filter.only_featured {
        qb.push("JOIN featured f ON f.artwork_id = a.id AND NOT f.removed ");
    }
    qb.push("LEFT JOIN category c ON c.id = a.category_id WHERE NOT a.removed");

    if let Some(min) = filter.min {
        qb.push(" AND a.price >= ").push_bind(min);
    }
    if let Some(max) = filter.max {
        qb.push(" AND a.price <= ").push_bind(max);
    }
    if let Some(title) = filter.title.as_deref() {
        qb.push(" AND a.title ILIKE ")
            .push_bind(substring_pattern(title));
    }
    if let Some(artist) = filter.artist_name.as_deref() {
        qb.push(" AND a.artist_name ILIKE ")
            .push_bind(substring_pattern(artist));
    }
    if let Some(category_id) = filter.category_id {
        qb.push(" AND a.category_id = ").push_bind(category_id);
    }

    qb.push(" ORDER BY a.created_at ");
    qb.push(filter.order.unwrap_or_default().as_sql());
    qb.push(" LIMIT ").push_bind(filter.limit());
    qb.push(" OFFSET ").push_bind(filter.offset());

    qb
}

/// Turn user input into an ILIKE substring pattern, escaping LIKE
/// metacharacters so they match literally.
fn substring_pattern(input: &str) -> String {
    let escaped = input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::artwork::SortOrder;
    use rust_decimal::Decimal;

    #[test]
    fn test_substring_pattern_escapes_metacharacters() {
        assert_eq!(substring_pattern("sun"), "%sun%");
        assert_eq!(substring_pattern("100%"), "%100\\%%");
        assert_eq!(substring_pattern("a_b"), "%a\\_b%");
        assert_eq!(substring_pattern("back\\slash"), "%back\\\\slash%");
    }

    #[test]
    fn test_search_query_no_filters() {
        let filter = ArtworkFilter::default();
        let qb = build_search_query(&filter);
        let sql = qb.sql();

        assert!(sql.contains("WHERE NOT a.removed"));
        assert!(!sql.contains("a.price >="));
        assert!(!sql.contains("ILIKE"));
        assert!(!sql.contains("JOIN featured"));
        // Default ordering is newest first; limit and offset always bound.
        assert!(sql.contains("ORDER BY a.created_at DESC"));
        assert!(sql.contains("LIMIT $1"));
        assert!(sql.contains("OFFSET $2"));
    }

    #[test]
    fn test_search_query_all_filters_bound() {
        let filter = ArtworkFilter {
            min: Some(Decimal::new(1000, 2)),
            max: Some(Decimal::new(50_000, 2)),
            title: Some("sunset".to_owned()),
            artist_name: Some("vermeer".to_owned()),
            category_id: Some(CategoryId::new(3)),
            only_featured: true,
            order: Some(SortOrder::Asc),
            n: Some(25),
            offset: Some(50),
        };
        let qb = build_search_query(&filter);
        let sql = qb.sql();

        assert!(sql.contains("JOIN featured f ON f.artwork_id = a.id"));
        assert!(sql.contains("a.price >= $1"));
        assert!(sql.contains("a.price <= $2"));
        assert!(sql.contains("a.title ILIKE $3"));
        assert!(sql.contains("a.artist_name ILIKE $4"));
        assert!(sql.contains("a.category_id = $5"));
        assert!(sql.contains("ORDER BY a.created_at ASC"));
        assert!(sql.contains("LIMIT $6"));
        assert!(sql.contains("OFFSET $7"));
        // No user text is ever spliced into the SQL itself.
        assert!(!sql.contains("sunset"));
        assert!(!sql.contains("vermeer"));
    }
}
