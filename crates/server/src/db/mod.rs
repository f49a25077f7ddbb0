//! Database operations for the marketplace `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `site_user` - Accounts (customer and admin, `is_admin` flag)
//! - `artwork`, `category`, `tag`, `artwork_tag` - Catalog
//! - `featured` - Promoted artworks
//! - `wishlisted` - Per-user wishlist joins
//! - `shopping_cart_item` - Per-user cart quantities (reserve stock)
//! - `purchase_order`, `ordered_artwork`, `invoice_data` - Checkout snapshots
//! - `review` - Moderated artwork reviews
//! - `admin_message` - Contact-form messages
//! - `translation` - Cached translation results
//! - `sessions` - Tower-sessions storage
//!
//! All deletions are soft: rows carry a `removed` flag and queries filter on
//! it; nothing is physically deleted.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p atelier-cli -- migrate
//! ```

pub mod artworks;
pub mod cart;
pub mod categories;
pub mod messages;
pub mod orders;
pub mod reviews;
pub mod tags;
pub mod translations;
pub mod users;
pub mod wishlist;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use artworks::ArtworkRepository;
pub use cart::{CartError, CartRepository};
pub use categories::CategoryRepository;
pub use messages::MessageRepository;
pub use orders::{OrderError, OrderRepository};
pub use reviews::ReviewRepository;
pub use tags::TagRepository;
pub use translations::TranslationRepository;
pub use users::UserRepository;
pub use wishlist::WishlistRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// One pool is shared by every repository for the lifetime of the process.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
