//! Tag repository: reconciling an artwork's tag set.

use std::collections::BTreeSet;

use atelier_core::{ArtworkId, TagId};
use sqlx::PgPool;

use super::RepositoryError;

/// Repository for tag operations.
pub struct TagRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TagRepository<'a> {
    /// Create a new tag repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Reconcile an artwork's active tags against a target name set.
    ///
    /// New names get a tag row created or reused (`ON CONFLICT (name)` keeps
    /// the lookup-or-insert step race-free) and a join row inserted or
    /// reactivated; names no longer present have their join rows
    /// soft-removed. The whole diff applies in one transaction and the
    /// operation is idempotent.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails.
    pub async fn reconcile(
        &self,
        artwork_id: ArtworkId,
        names: &[String],
    ) -> Result<(), RepositoryError> {
        let target = normalize_names(names);

        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, (TagId, String)>(
            "SELECT t.id, t.name FROM artwork_tag at \
             JOIN tag t ON t.id = at.tag_id \
             WHERE at.artwork_id = $1 AND NOT at.removed",
        )
        .bind(artwork_id)
        .fetch_all(&mut *tx)
        .await?;

        let (to_add, to_remove) = reconcile_plan(&current, &target);

        for name in to_add {
            let tag_id = sqlx::query_scalar::<_, TagId>(
                "INSERT INTO tag (name) VALUES ($1) \
                 ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name \
                 RETURNING id",
            )
            .bind(name)
            .fetch_one(&mut *tx)
            .await?;

            sqlx::query(
                "INSERT INTO artwork_tag (artwork_id, tag_id) VALUES ($1, $2) \
                 ON CONFLICT (artwork_id, tag_id) DO UPDATE SET removed = FALSE",
            )
            .bind(artwork_id)
            .bind(tag_id)
            .execute(&mut *tx)
            .await?;
        }

        for tag_id in to_remove {
            sqlx::query(
                "UPDATE artwork_tag SET removed = TRUE \
                 WHERE artwork_id = $1 AND tag_id = $2",
            )
            .bind(artwork_id)
            .bind(tag_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

/// Diff the active tag rows against the target name set: names to attach
/// and join rows to soft-remove.
fn reconcile_plan<'n>(
    current: &'n [(TagId, String)],
    target: &'n BTreeSet<String>,
) -> (Vec<&'n str>, Vec<TagId>) {
    let current_names: BTreeSet<&str> = current.iter().map(|(_, n)| n.as_str()).collect();
    let to_add = target
        .iter()
        .map(String::as_str)
        .filter(|n| !current_names.contains(n))
        .collect();
    let to_remove = current
        .iter()
        .filter(|(_, name)| !target.contains(name))
        .map(|(id, _)| *id)
        .collect();
    (to_add, to_remove)
}

/// Trim, drop empties, and dedupe the requested tag names.
fn normalize_names(names: &[String]) -> BTreeSet<String> {
    names
        .iter()
        .map(|n| n.trim().to_owned())
        .filter(|n| !n.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_trims_and_dedupes() {
        let names = vec![
            " oil ".to_owned(),
            "oil".to_owned(),
            String::new(),
            "  ".to_owned(),
            "portrait".to_owned(),
        ];
        let normalized = normalize_names(&names);
        assert_eq!(normalized.len(), 2);
        assert!(normalized.contains("oil"));
        assert!(normalized.contains("portrait"));
    }

    #[test]
    fn test_normalize_empty_input() {
        assert!(normalize_names(&[]).is_empty());
    }

    #[test]
    fn test_reapplying_same_tag_set_is_a_no_op() {
        let current = vec![
            (TagId::new(1), "oil".to_owned()),
            (TagId::new(2), "portrait".to_owned()),
        ];
        let target = normalize_names(&["portrait".to_owned(), " oil ".to_owned()]);

        let (to_add, to_remove) = reconcile_plan(&current, &target);
        assert!(to_add.is_empty());
        assert!(to_remove.is_empty());
    }

    #[test]
    fn test_plan_diffs_additions_and_removals() {
        let current = vec![
            (TagId::new(1), "oil".to_owned()),
            (TagId::new(2), "portrait".to_owned()),
        ];
        let target = normalize_names(&["oil".to_owned(), "landscape".to_owned()]);

        let (to_add, to_remove) = reconcile_plan(&current, &target);
        assert_eq!(to_add, vec!["landscape"]);
        assert_eq!(to_remove, vec![TagId::new(2)]);
    }
}
