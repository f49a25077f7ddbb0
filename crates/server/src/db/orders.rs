//! Order repository: checkout snapshots and order history.

use std::collections::HashMap;

use atelier_core::{ArtworkId, OrderId, Price, UserId};
use sqlx::{FromRow, PgPool};
use thiserror::Error;

use super::RepositoryError;
use crate::models::order::{InvoiceDetails, Order, OrderLine, OrderWithLines};

/// Errors from order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Underlying repository failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Checkout was attempted with an empty cart.
    #[error("cannot place an order with an empty cart")]
    EmptyCart,
}

impl From<sqlx::Error> for OrderError {
    fn from(e: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(e))
    }
}

#[derive(Debug, FromRow)]
struct CartSnapshotRow {
    artwork_id: ArtworkId,
    price: Price,
    quantity: i32,
}

/// Repository for order operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Place an order from the user's current cart.
    ///
    /// Snapshots every non-zero cart row (price and quantity at this moment)
    /// into a new order with one line per row, stores the invoice contact
    /// details, and zeroes the consumed cart rows, all in one transaction.
    /// Stock is not touched: it was already decremented when the items were
    /// reserved into the cart.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::EmptyCart`] without writing anything when the
    /// cart holds no items.
    pub async fn checkout(
        &self,
        user_id: UserId,
        invoice: &InvoiceDetails,
    ) -> Result<OrderId, OrderError> {
        let mut tx = self.pool.begin().await?;

        let lines = sqlx::query_as::<_, CartSnapshotRow>(
            "SELECT ci.artwork_id, a.price, ci.quantity \
             FROM shopping_cart_item ci \
             JOIN artwork a ON a.id = ci.artwork_id \
             WHERE ci.user_id = $1 AND ci.quantity > 0 \
             FOR UPDATE OF ci",
        )
        .bind(user_id)
        .fetch_all(&mut *tx)
        .await?;

        if lines.is_empty() {
            return Err(OrderError::EmptyCart);
        }

        let order_id = sqlx::query_scalar::<_, OrderId>(
            "INSERT INTO purchase_order (user_id) VALUES ($1) RETURNING id",
        )
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        for line in &lines {
            sqlx::query(
                "INSERT INTO ordered_artwork (order_id, artwork_id, price, quantity) \
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(order_id)
            .bind(line.artwork_id)
            .bind(line.price)
            .bind(line.quantity)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query(
            "INSERT INTO invoice_data (order_id, first_name, last_name, email, address, phone) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(order_id)
        .bind(&invoice.first_name)
        .bind(&invoice.last_name)
        .bind(&invoice.email)
        .bind(&invoice.address)
        .bind(&invoice.phone)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE shopping_cart_item SET quantity = 0 \
             WHERE user_id = $1 AND quantity > 0",
        )
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(order_id)
    }

    /// A user's orders with line items, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn for_user(&self, user_id: UserId) -> Result<Vec<OrderWithLines>, RepositoryError> {
        let orders = sqlx::query_as::<_, Order>(
            "SELECT id, user_id, created_at FROM purchase_order \
             WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        self.attach_lines(orders).await
    }

    /// All orders in the system with line items, newest first (admin view).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn all(&self) -> Result<Vec<OrderWithLines>, RepositoryError> {
        let orders = sqlx::query_as::<_, Order>(
            "SELECT id, user_id, created_at FROM purchase_order ORDER BY created_at DESC",
        )
        .fetch_all(self.pool)
        .await?;

        self.attach_lines(orders).await
    }

    /// Load line items for a batch of order headers in one query.
    async fn attach_lines(
        &self,
        orders: Vec<Order>,
    ) -> Result<Vec<OrderWithLines>, RepositoryError> {
        if orders.is_empty() {
            return Ok(Vec::new());
        }

        let order_ids: Vec<i32> = orders.iter().map(|o| o.id.as_i32()).collect();
        let lines = sqlx::query_as::<_, OrderLine>(
            "SELECT oa.order_id, oa.artwork_id, a.title, oa.price, oa.quantity \
             FROM ordered_artwork oa \
             JOIN artwork a ON a.id = oa.artwork_id \
             WHERE oa.order_id = ANY($1) \
             ORDER BY oa.order_id, a.title",
        )
        .bind(&order_ids)
        .fetch_all(self.pool)
        .await?;

        let mut by_order: HashMap<OrderId, Vec<OrderLine>> = HashMap::new();
        for line in lines {
            by_order.entry(line.order_id).or_default().push(line);
        }

        Ok(orders
            .into_iter()
            .map(|order| {
                let lines = by_order.remove(&order.id).unwrap_or_default();
                OrderWithLines {
                    id: order.id,
                    user_id: order.user_id,
                    created_at: order.created_at,
                    lines,
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_cart_error_message() {
        assert_eq!(
            OrderError::EmptyCart.to_string(),
            "cannot place an order with an empty cart"
        );
    }
}
