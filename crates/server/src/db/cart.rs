//! Shopping cart repository: stock/cart quantity reconciliation.
//!
//! Stock and cart quantities move in lockstep: reserving into the cart
//! decrements `artwork.quantity`, releasing returns it. Every multi-statement
//! operation runs inside one transaction with the artwork row locked
//! (`SELECT ... FOR UPDATE`), always in the same order: lock artwork, check
//! availability, move stock, upsert cart row.

use atelier_core::{ArtworkId, UserId};
use sqlx::{PgPool, Postgres, Transaction};
use thiserror::Error;

use super::RepositoryError;
use crate::models::cart::{CartEntry, CartLine};

/// Errors from cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// Underlying repository failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// The artwork does not have enough stock for the requested quantity.
    #[error("not enough stock: {available} available")]
    OutOfStock {
        /// Units still available for reservation.
        available: i32,
    },

    /// The requested quantity must be positive.
    #[error("quantity must be positive")]
    NonPositiveQuantity,
}

impl From<sqlx::Error> for CartError {
    fn from(e: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(e))
    }
}

/// Repository for shopping cart operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The user's current non-empty cart rows, joined with artwork details.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items(&self, user_id: UserId) -> Result<Vec<CartLine>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartLine>(
            "SELECT ci.artwork_id, a.title, a.artist_name, a.price, ci.quantity \
             FROM shopping_cart_item ci \
             JOIN artwork a ON a.id = ci.artwork_id \
             WHERE ci.user_id = $1 AND ci.quantity > 0 \
             ORDER BY a.title",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Reserve `quantity` more units of an artwork into the user's cart.
    ///
    /// Decrements artwork stock and increments (or creates) the cart row by
    /// the same amount, atomically.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::OutOfStock`] when fewer units are available,
    /// [`CartError::NonPositiveQuantity`] for a zero or negative request, and
    /// `RepositoryError::NotFound` when the artwork does not exist.
    pub async fn reserve(
        &self,
        user_id: UserId,
        artwork_id: ArtworkId,
        quantity: i32,
    ) -> Result<(), CartError> {
        if quantity <= 0 {
            return Err(CartError::NonPositiveQuantity);
        }

        let mut tx = self.pool.begin().await?;

        let available = lock_artwork_stock(&mut tx, artwork_id)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        if available < quantity {
            return Err(CartError::OutOfStock { available });
        }

        sqlx::query("UPDATE artwork SET quantity = quantity - $2 WHERE id = $1")
            .bind(artwork_id)
            .bind(quantity)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO shopping_cart_item (user_id, artwork_id, quantity) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (user_id, artwork_id) \
             DO UPDATE SET quantity = shopping_cart_item.quantity + EXCLUDED.quantity",
        )
        .bind(user_id)
        .bind(artwork_id)
        .bind(quantity)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Return up to `quantity` units from the user's cart to stock.
    ///
    /// Returning more than the cart holds is clamped; a missing cart row is
    /// a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NonPositiveQuantity`] for a zero or negative
    /// request, otherwise only database failures.
    pub async fn release(
        &self,
        user_id: UserId,
        artwork_id: ArtworkId,
        quantity: i32,
    ) -> Result<(), CartError> {
        if quantity <= 0 {
            return Err(CartError::NonPositiveQuantity);
        }

        let mut tx = self.pool.begin().await?;
        release_in_tx(&mut tx, user_id, artwork_id, Some(quantity)).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Remove an artwork from the cart entirely, returning its full
    /// quantity to stock.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` wrapped in [`CartError`] on
    /// database failure.
    pub async fn remove(&self, user_id: UserId, artwork_id: ArtworkId) -> Result<(), CartError> {
        let mut tx = self.pool.begin().await?;
        release_in_tx(&mut tx, user_id, artwork_id, None).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Replace the saved cart with a new list of entries.
    ///
    /// All prior reservations are first returned to stock, then each
    /// requested entry is applied with its quantity clamped to the stock
    /// available at that moment. Returns the resulting cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` wrapped in [`CartError`] on
    /// database failure.
    pub async fn replace(
        &self,
        user_id: UserId,
        entries: &[CartEntry],
    ) -> Result<Vec<CartLine>, CartError> {
        let mut tx = self.pool.begin().await?;

        let held = sqlx::query_as::<_, (ArtworkId, i32)>(
            "SELECT artwork_id, quantity FROM shopping_cart_item \
             WHERE user_id = $1 AND quantity > 0",
        )
        .bind(user_id)
        .fetch_all(&mut *tx)
        .await?;

        // Same lock order as `reserve`: every involved artwork row is locked
        // before any cart row is touched. Sorted ids keep concurrent replaces
        // from deadlocking against each other.
        let involved = involved_artwork_ids(&held, entries);
        sqlx::query("SELECT id FROM artwork WHERE id = ANY($1) ORDER BY id FOR UPDATE")
            .bind(&involved)
            .execute(&mut *tx)
            .await?;

        // Re-read under the locks; the pre-lock snapshot may be stale.
        let held = sqlx::query_as::<_, (ArtworkId, i32)>(
            "SELECT artwork_id, quantity FROM shopping_cart_item \
             WHERE user_id = $1 AND quantity > 0",
        )
        .bind(user_id)
        .fetch_all(&mut *tx)
        .await?;

        // Return everything currently held by this user to stock.
        for (artwork_id, quantity) in held {
            sqlx::query("UPDATE artwork SET quantity = quantity + $2 WHERE id = $1")
                .bind(artwork_id)
                .bind(quantity)
                .execute(&mut *tx)
                .await?;
        }
        sqlx::query("UPDATE shopping_cart_item SET quantity = 0 WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        // Re-apply the requested list, clamping to available stock.
        for entry in entries {
            if entry.quantity <= 0 {
                continue;
            }
            let Some(available) = lock_artwork_stock(&mut tx, entry.artwork_id).await? else {
                continue;
            };
            let granted = entry.quantity.min(available);
            if granted == 0 {
                continue;
            }

            sqlx::query("UPDATE artwork SET quantity = quantity - $2 WHERE id = $1")
                .bind(entry.artwork_id)
                .bind(granted)
                .execute(&mut *tx)
                .await?;
            sqlx::query(
                "INSERT INTO shopping_cart_item (user_id, artwork_id, quantity) \
                 VALUES ($1, $2, $3) \
                 ON CONFLICT (user_id, artwork_id) \
                 DO UPDATE SET quantity = shopping_cart_item.quantity + EXCLUDED.quantity",
            )
            .bind(user_id)
            .bind(entry.artwork_id)
            .bind(granted)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        self.items(user_id).await.map_err(CartError::from)
    }
}

/// Lock a non-removed artwork row and return its stock quantity.
async fn lock_artwork_stock(
    tx: &mut Transaction<'_, Postgres>,
    artwork_id: ArtworkId,
) -> Result<Option<i32>, sqlx::Error> {
    sqlx::query_scalar::<_, i32>(
        "SELECT quantity FROM artwork WHERE id = $1 AND NOT removed FOR UPDATE",
    )
    .bind(artwork_id)
    .fetch_optional(&mut **tx)
    .await
}

/// The sorted, deduplicated ids of every artwork a replace will touch.
///
/// Deterministic lock order; `reserve` and `release` lock the artwork row
/// first, so replace must too, and concurrent replaces must agree on the
/// order among themselves.
fn involved_artwork_ids(held: &[(ArtworkId, i32)], entries: &[CartEntry]) -> Vec<i32> {
    let mut ids: Vec<i32> = held
        .iter()
        .map(|(id, _)| id.as_i32())
        .chain(
            entries
                .iter()
                .filter(|e| e.quantity > 0)
                .map(|e| e.artwork_id.as_i32()),
        )
        .collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

/// Return cart quantity to stock within an open transaction.
///
/// `quantity` of `None` releases the whole cart row. Missing or empty cart
/// rows are no-ops. Locks the artwork row before the cart row, in the same
/// order as `reserve`.
async fn release_in_tx(
    tx: &mut Transaction<'_, Postgres>,
    user_id: UserId,
    artwork_id: ArtworkId,
    quantity: Option<i32>,
) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT id FROM artwork WHERE id = $1 FOR UPDATE")
        .bind(artwork_id)
        .execute(&mut **tx)
        .await?;

    let held = sqlx::query_scalar::<_, i32>(
        "SELECT quantity FROM shopping_cart_item \
         WHERE user_id = $1 AND artwork_id = $2 FOR UPDATE",
    )
    .bind(user_id)
    .bind(artwork_id)
    .fetch_optional(&mut **tx)
    .await?
    .unwrap_or(0);

    let returned = quantity.map_or(held, |q| q.min(held));
    if returned == 0 {
        return Ok(());
    }

    sqlx::query(
        "UPDATE shopping_cart_item SET quantity = quantity - $3 \
         WHERE user_id = $1 AND artwork_id = $2",
    )
    .bind(user_id)
    .bind(artwork_id)
    .bind(returned)
    .execute(&mut **tx)
    .await?;

    sqlx::query("UPDATE artwork SET quantity = quantity + $2 WHERE id = $1")
        .bind(artwork_id)
        .bind(returned)
        .execute(&mut **tx)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_stock_message_names_availability() {
        let err = CartError::OutOfStock { available: 2 };
        assert_eq!(err.to_string(), "not enough stock: 2 available");
    }

    #[test]
    fn test_repository_error_wraps_transparently() {
        let err = CartError::from(RepositoryError::NotFound);
        assert_eq!(err.to_string(), "not found");
    }

    #[test]
    fn test_replace_lock_set_is_sorted_and_deduplicated() {
        let held = vec![(ArtworkId::new(7), 2), (ArtworkId::new(3), 1)];
        let entries = vec![
            CartEntry {
                artwork_id: ArtworkId::new(7),
                quantity: 1,
            },
            CartEntry {
                artwork_id: ArtworkId::new(1),
                quantity: 4,
            },
            // Non-positive entries are skipped by replace, so they take
            // no lock either.
            CartEntry {
                artwork_id: ArtworkId::new(5),
                quantity: 0,
            },
        ];

        assert_eq!(involved_artwork_ids(&held, &entries), vec![1, 3, 7]);
    }
}
