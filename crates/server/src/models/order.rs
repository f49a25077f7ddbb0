//! Order and invoice models.

use atelier_core::{ArtworkId, OrderId, Price, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An order header row.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
}

/// One ordered line item with price and quantity snapshotted at checkout.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OrderLine {
    pub order_id: OrderId,
    pub artwork_id: ArtworkId,
    pub title: String,
    pub price: Price,
    pub quantity: i32,
}

/// Invoice contact details captured at checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub address: String,
    pub phone: Option<String>,
}

/// An order with its line items, as returned to clients.
#[derive(Debug, Clone, Serialize)]
pub struct OrderWithLines {
    pub id: OrderId,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub lines: Vec<OrderLine>,
}
