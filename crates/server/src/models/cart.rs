//! Shopping cart models.

use atelier_core::{ArtworkId, Price};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A cart row joined with artwork details, as returned to clients.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CartLine {
    pub artwork_id: ArtworkId,
    pub title: String,
    pub artist_name: String,
    pub price: Price,
    pub quantity: i32,
}

/// A requested cart entry: add this many of that artwork.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CartEntry {
    pub artwork_id: ArtworkId,
    pub quantity: i32,
}
