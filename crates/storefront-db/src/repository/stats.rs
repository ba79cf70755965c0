//! # Stats Repository
//!
//! Read-only aggregates for the admin dashboard.
//!
//! ```text
//! ┌──────────────────────── /admin/dashboard ───────────────────────────────┐
//! │  summary()              users · active products · orders · revenue      │
//! │  popular_products(5)    Σ quantity per product, cancelled excluded      │
//! │  order_status_counts()  pending: 3, shipped: 1, ...                     │
//! │  recent_orders(10)      newest orders with customer name/email          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use sqlx::SqlitePool;

use super::order::{OrderRepository, OrderWithCustomer};
use super::PRODUCT_COLUMNS_P;
use crate::error::DbResult;
use storefront_core::{OrderStatus, Product};

/// Headline counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSummary {
    pub total_users: i64,
    /// Active products only.
    pub total_products: i64,
    pub total_orders: i64,
    /// Sum of orders whose payment has completed, in minor units.
    pub total_revenue_cents: i64,
}

/// A product and how many units of it have sold.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PopularProduct {
    #[sqlx(flatten)]
    pub product: Product,
    pub total_sold: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct StatusCount {
    pub status: OrderStatus,
    pub count: i64,
}

/// Repository for dashboard aggregates.
#[derive(Debug, Clone)]
pub struct StatsRepository {
    pool: SqlitePool,
}

impl StatsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        StatsRepository { pool }
    }

    pub async fn summary(&self) -> DbResult<StoreSummary> {
        let (total_users, total_products, total_orders, total_revenue_cents): (i64, i64, i64, i64) =
            sqlx::query_as(
                r#"
                SELECT
                    (SELECT COUNT(*) FROM users),
                    (SELECT COUNT(*) FROM products WHERE is_active = 1),
                    (SELECT COUNT(*) FROM orders),
                    (SELECT COALESCE(SUM(total_amount_cents), 0) FROM orders
                        WHERE payment_status = 'completed')
                "#,
            )
            .fetch_one(&self.pool)
            .await?;

        Ok(StoreSummary {
            total_users,
            total_products,
            total_orders,
            total_revenue_cents,
        })
    }

    pub async fn recent_orders(&self, limit: i64) -> DbResult<Vec<OrderWithCustomer>> {
        OrderRepository::new(self.pool.clone())
            .list_all_with_customer(Some(limit))
            .await
    }

    /// Best sellers by units, ignoring cancelled orders.
    pub async fn popular_products(&self, limit: i64) -> DbResult<Vec<PopularProduct>> {
        let popular = sqlx::query_as::<_, PopularProduct>(&format!(
            "SELECT {PRODUCT_COLUMNS_P}, SUM(oi.quantity) AS total_sold \
             FROM order_items oi \
             JOIN orders o ON o.id = oi.order_id \
             JOIN products p ON p.id = oi.product_id \
             WHERE o.order_status != 'cancelled' \
             GROUP BY p.id \
             ORDER BY total_sold DESC, p.name ASC \
             LIMIT ?"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(popular)
    }

    /// Number of orders in each status that has at least one order.
    pub async fn order_status_counts(&self) -> DbResult<Vec<StatusCount>> {
        let counts = sqlx::query_as::<_, StatusCount>(
            "SELECT order_status AS status, COUNT(*) AS count \
             FROM orders GROUP BY order_status ORDER BY count DESC, order_status ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::order::OrderStatusUpdate;
    use crate::repository::test_support::{create_product, create_user, test_db};
    use storefront_core::{Cart, CartLine, PaymentMethod, PaymentStatus, ShippingAddress};

    fn cart(product_id: &str, quantity: i64) -> Cart {
        Cart::from_lines(vec![CartLine {
            product_id: product_id.to_string(),
            quantity,
        }])
        .unwrap()
    }

    #[tokio::test]
    async fn test_empty_store() {
        let db = test_db().await;
        let summary = db.stats().summary().await.unwrap();

        assert_eq!(
            summary,
            StoreSummary {
                total_users: 0,
                total_products: 0,
                total_orders: 0,
                total_revenue_cents: 0,
            }
        );
        assert!(db.stats().popular_products(5).await.unwrap().is_empty());
        assert!(db.stats().order_status_counts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_dashboard_aggregates() {
        let db = test_db().await;
        let user = create_user(&db, "buyer@example.com").await;
        let saree = create_product(&db, "Saree", 10_000, 50).await;
        let kurta = create_product(&db, "Kurta", 5_000, 50).await;
        let address = ShippingAddress::default();

        let paid = db
            .orders()
            .place_order(&user.id, &cart(&saree.id, 2), &address, PaymentMethod::Card)
            .await
            .unwrap();
        db.orders()
            .update_status(
                &paid.id,
                OrderStatusUpdate {
                    order_status: Some(OrderStatus::Confirmed),
                    payment_status: Some(PaymentStatus::Completed),
                    transaction_id: None,
                },
            )
            .await
            .unwrap();

        db.orders()
            .place_order(&user.id, &cart(&kurta.id, 3), &address, PaymentMethod::Cod)
            .await
            .unwrap();

        let cancelled = db
            .orders()
            .place_order(&user.id, &cart(&kurta.id, 10), &address, PaymentMethod::Cod)
            .await
            .unwrap();
        db.orders()
            .update_status(
                &cancelled.id,
                OrderStatusUpdate {
                    order_status: Some(OrderStatus::Cancelled),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let summary = db.stats().summary().await.unwrap();
        assert_eq!(summary.total_users, 1);
        assert_eq!(summary.total_products, 2);
        assert_eq!(summary.total_orders, 3);
        assert_eq!(summary.total_revenue_cents, 20_000);

        let popular = db.stats().popular_products(5).await.unwrap();
        assert_eq!(popular.len(), 2);
        assert_eq!(popular[0].product.id, kurta.id);
        assert_eq!(popular[0].total_sold, 3);
        assert_eq!(popular[1].total_sold, 2);

        let counts = db.stats().order_status_counts().await.unwrap();
        assert_eq!(counts.len(), 3);
        assert!(counts
            .iter()
            .all(|c| c.count == 1));

        let recent = db.stats().recent_orders(2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].order.id, cancelled.id);
    }
}
