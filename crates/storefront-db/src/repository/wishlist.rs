//! # Wishlist Repository
//!
//! One row per (user, product) pair.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use super::PRODUCT_COLUMNS_P;
use crate::error::{DbError, DbResult};
use storefront_core::Product;

/// Repository for wishlist database operations.
#[derive(Debug, Clone)]
pub struct WishlistRepository {
    pool: SqlitePool,
}

impl WishlistRepository {
    pub fn new(pool: SqlitePool) -> Self {
        WishlistRepository { pool }
    }

    /// Saves a product to the user's wishlist.
    ///
    /// ## Errors
    /// - `NotFound` if the product does not exist or is inactive
    /// - `Domain(Conflict)` if it is already saved
    pub async fn add(&self, user_id: &str, product_id: &str) -> DbResult<()> {
        debug!(user_id = %user_id, product_id = %product_id, "Adding to wishlist");

        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM products WHERE id = ? AND is_active = 1)",
        )
        .bind(product_id)
        .fetch_one(&self.pool)
        .await?;

        if !exists {
            return Err(DbError::not_found("Product", product_id));
        }

        let inserted =
            sqlx::query("INSERT INTO wishlist_items (user_id, product_id, added_at) VALUES (?, ?, ?)")
                .bind(user_id)
                .bind(product_id)
                .bind(Utc::now())
                .execute(&self.pool)
                .await;

        match inserted {
            Ok(_) => Ok(()),
            Err(e) => match DbError::from(e) {
                DbError::UniqueViolation { .. } => {
                    Err(DbError::conflict("Product already in wishlist"))
                }
                other => Err(other),
            },
        }
    }

    /// Removes a product from the user's wishlist.
    pub async fn remove(&self, user_id: &str, product_id: &str) -> DbResult<()> {
        debug!(user_id = %user_id, product_id = %product_id, "Removing from wishlist");

        let result = sqlx::query("DELETE FROM wishlist_items WHERE user_id = ? AND product_id = ?")
            .bind(user_id)
            .bind(product_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Wishlist item", product_id));
        }

        Ok(())
    }

    /// The saved products that are still on sale, most recently saved first.
    pub async fn list_products(&self, user_id: &str) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS_P} FROM wishlist_items w \
             JOIN products p ON p.id = w.product_id \
             WHERE w.user_id = ? AND p.is_active = 1 \
             ORDER BY w.added_at DESC, w.rowid DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{create_product, create_user, test_db};
    use storefront_core::CoreError;

    #[tokio::test]
    async fn test_add_list_remove() {
        let db = test_db().await;
        let user = create_user(&db, "asha@example.com").await;
        let saree = create_product(&db, "Saree", 1_000, 5).await;
        let kurta = create_product(&db, "Kurta", 2_000, 5).await;

        db.wishlist().add(&user.id, &saree.id).await.unwrap();
        db.wishlist().add(&user.id, &kurta.id).await.unwrap();

        let products = db.wishlist().list_products(&user.id).await.unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].id, kurta.id);

        db.wishlist().remove(&user.id, &saree.id).await.unwrap();
        let products = db.wishlist().list_products(&user.id).await.unwrap();
        assert_eq!(products.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_add_is_conflict() {
        let db = test_db().await;
        let user = create_user(&db, "asha@example.com").await;
        let saree = create_product(&db, "Saree", 1_000, 5).await;

        db.wishlist().add(&user.id, &saree.id).await.unwrap();
        let err = db.wishlist().add(&user.id, &saree.id).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_missing_product_and_missing_entry() {
        let db = test_db().await;
        let user = create_user(&db, "asha@example.com").await;

        let err = db.wishlist().add(&user.id, "missing").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        let err = db.wishlist().remove(&user.id, "missing").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_inactive_products_hidden() {
        let db = test_db().await;
        let user = create_user(&db, "asha@example.com").await;
        let saree = create_product(&db, "Saree", 1_000, 5).await;

        db.wishlist().add(&user.id, &saree.id).await.unwrap();
        db.products().soft_delete(&saree.id).await.unwrap();

        assert!(db.wishlist().list_products(&user.id).await.unwrap().is_empty());
    }
}
