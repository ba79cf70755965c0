//! # Review Repository
//!
//! Product reviews and the rating aggregates stored on `products`.
//!
//! ```text
//! create_review(rating = 4)
//!      │
//!      ▼  BEGIN
//! INSERT reviews ............ UNIQUE(user_id, product_id) → Conflict
//! UPDATE products
//!   SET rating_total = rating_total + 4,
//!       review_count = review_count + 1
//!      │
//!      ▼  COMMIT
//! product.rating() = rating_total / review_count
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use storefront_core::Review;

/// A review with the reviewer's display name.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReviewWithAuthor {
    #[sqlx(flatten)]
    pub review: Review,
    pub user_name: String,
}

/// Repository for review database operations.
#[derive(Debug, Clone)]
pub struct ReviewRepository {
    pool: SqlitePool,
}

impl ReviewRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ReviewRepository { pool }
    }

    /// Creates a review and folds its rating into the product aggregate.
    ///
    /// `rating` and `comment` must already be validated.
    ///
    /// ## Errors
    /// - `NotFound` if the product does not exist or is inactive
    /// - `Domain(Conflict)` if this user already reviewed the product
    pub async fn create(
        &self,
        user_id: &str,
        product_id: &str,
        rating: i64,
        comment: &str,
    ) -> DbResult<Review> {
        debug!(user_id = %user_id, product_id = %product_id, rating, "Creating review");

        let mut tx = self.pool.begin().await?;

        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM products WHERE id = ? AND is_active = 1)",
        )
        .bind(product_id)
        .fetch_one(&mut *tx)
        .await?;

        if !exists {
            return Err(DbError::not_found("Product", product_id));
        }

        let now = Utc::now();
        let review = Review {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            product_id: product_id.to_string(),
            rating,
            comment: comment.to_string(),
            created_at: now,
            updated_at: now,
        };

        let inserted = sqlx::query(
            r#"
            INSERT INTO reviews (id, user_id, product_id, rating, comment, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&review.id)
        .bind(&review.user_id)
        .bind(&review.product_id)
        .bind(review.rating)
        .bind(&review.comment)
        .bind(review.created_at)
        .bind(review.updated_at)
        .execute(&mut *tx)
        .await;

        if let Err(e) = inserted {
            return match DbError::from(e) {
                DbError::UniqueViolation { .. } => {
                    Err(DbError::conflict("You have already reviewed this product"))
                }
                other => Err(other),
            };
        }

        sqlx::query(
            r#"
            UPDATE products
            SET
                rating_total = rating_total + ?,
                review_count = review_count + 1,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(review.rating)
        .bind(now)
        .bind(product_id)
        .execute(&mut *tx)
        .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(review_id = %review.id, product_id = %product_id, "Review created");

        Ok(review)
    }

    /// Reviews of a product, newest first.
    pub async fn list_for_product(&self, product_id: &str) -> DbResult<Vec<ReviewWithAuthor>> {
        let reviews = sqlx::query_as::<_, ReviewWithAuthor>(
            r#"
            SELECT
                r.id, r.user_id, r.product_id, r.rating, r.comment,
                r.created_at, r.updated_at,
                COALESCE(u.name, '') AS user_name
            FROM reviews r
            LEFT JOIN users u ON u.id = r.user_id
            WHERE r.product_id = ?
            ORDER BY r.created_at DESC, r.rowid DESC
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reviews)
    }
}
