//! # Order Repository
//!
//! Checkout and fulfilment.
//!
//! ## Order Placement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  place_order (ONE transaction)                          │
//! │                                                                         │
//! │  BEGIN                                                                 │
//! │   │                                                                     │
//! │   ├── for each cart line:                                              │
//! │   │     SELECT active product          ── missing? → NotFound          │
//! │   │     UPDATE stock = stock - qty                                     │
//! │   │       WHERE stock >= qty           ── 0 rows?  → InsufficientStock │
//! │   │     snapshot name + unit price                                     │
//! │   │                                                                     │
//! │   ├── INSERT order (total = Σ price × qty)                             │
//! │   ├── INSERT order_items                                               │
//! │   │                                                                     │
//! │  COMMIT                                                                │
//! │                                                                         │
//! │  Any error drops the transaction and rolls back every decrement.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Status Updates
//! Status changes are checked against `OrderStatus::can_transition_to`.
//! Cancelling puts the order's quantities back on the shelf in the same
//! transaction as the status change.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use super::PRODUCT_COLUMNS;
use crate::error::{DbError, DbResult};
use storefront_core::cart::{order_total, Cart};
use storefront_core::order_flow::transition;
use storefront_core::{
    CoreError, Money, Order, OrderItem, OrderStatus, PaymentMethod, PaymentStatus, Product,
    ShippingAddress,
};

const ORDER_COLUMNS: &str = "o.id, o.user_id, o.total_amount_cents, o.shipping_name, \
     o.shipping_address, o.shipping_city, o.shipping_state, o.shipping_pincode, \
     o.shipping_phone, o.payment_status, o.order_status, o.payment_method, \
     o.transaction_id, o.created_at, o.updated_at";

// =============================================================================
// Row Types
// =============================================================================

/// Flat `orders` row. Items are loaded separately.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: String,
    user_id: String,
    total_amount_cents: i64,
    shipping_name: String,
    shipping_address: String,
    shipping_city: String,
    shipping_state: String,
    shipping_pincode: String,
    shipping_phone: String,
    payment_status: PaymentStatus,
    order_status: OrderStatus,
    payment_method: PaymentMethod,
    transaction_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> Order {
        Order {
            id: self.id,
            user_id: self.user_id,
            items,
            total_amount_cents: self.total_amount_cents,
            shipping_address: ShippingAddress {
                name: self.shipping_name,
                address: self.shipping_address,
                city: self.shipping_city,
                state: self.shipping_state,
                pincode: self.shipping_pincode,
                phone: self.shipping_phone,
            },
            payment_status: self.payment_status,
            order_status: self.order_status,
            payment_method: self.payment_method,
            transaction_id: self.transaction_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CustomerOrderRow {
    #[sqlx(flatten)]
    order: OrderRow,
    customer_name: String,
    customer_email: String,
}

/// An order together with the customer who placed it (admin views).
#[derive(Debug, Clone)]
pub struct OrderWithCustomer {
    pub order: Order,
    pub customer_name: String,
    pub customer_email: String,
}

/// Admin edit of an order. `None` leaves the field alone.
#[derive(Debug, Clone, Default)]
pub struct OrderStatusUpdate {
    pub order_status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub transaction_id: Option<String>,
}

impl OrderStatusUpdate {
    pub fn is_empty(&self) -> bool {
        self.order_status.is_none() && self.payment_status.is_none() && self.transaction_id.is_none()
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Places an order for `user_id`, taking the cart's quantities out of
    /// stock atomically.
    ///
    /// ## Errors
    /// - `NotFound` if a product does not exist or is no longer on sale
    /// - `Domain(InsufficientStock)` naming the first product that is short
    ///
    /// On error no stock is changed and no order exists.
    pub async fn place_order(
        &self,
        user_id: &str,
        cart: &Cart,
        shipping: &ShippingAddress,
        payment_method: PaymentMethod,
    ) -> DbResult<Order> {
        if cart.is_empty() {
            return Err(CoreError::EmptyCart.into());
        }

        let order_id = Uuid::new_v4().to_string();
        let now = Utc::now();

        debug!(
            order_id = %order_id,
            user_id = %user_id,
            lines = cart.item_count(),
            "Placing order"
        );

        let mut tx = self.pool.begin().await?;
        let mut items = Vec::with_capacity(cart.item_count());

        for line in cart.lines() {
            let product = sqlx::query_as::<_, Product>(&format!(
                "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ? AND is_active = 1"
            ))
            .bind(&line.product_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found("Product", &line.product_id))?;

            let insufficient = || CoreError::InsufficientStock {
                product: product.name.clone(),
                available: product.stock,
                requested: line.quantity,
            };

            if !product.can_fulfil(line.quantity) {
                return Err(insufficient().into());
            }

            // Guarded decrement: a concurrent checkout may have taken the
            // stock between the SELECT and here.
            let result = sqlx::query(
                "UPDATE products SET stock = stock - ?, updated_at = ? WHERE id = ? AND stock >= ?",
            )
            .bind(line.quantity)
            .bind(now)
            .bind(&product.id)
            .bind(line.quantity)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                return Err(insufficient().into());
            }

            items.push(OrderItem {
                id: Uuid::new_v4().to_string(),
                order_id: order_id.clone(),
                product_id: product.id.clone(),
                name_snapshot: product.name.clone(),
                unit_price_cents: product.price_cents,
                quantity: line.quantity,
            });
        }

        let total = order_total(
            items
                .iter()
                .map(|item| (Money::from_cents(item.unit_price_cents), item.quantity)),
        )?;

        let order = Order {
            id: order_id,
            user_id: user_id.to_string(),
            items,
            total_amount_cents: total.cents(),
            shipping_address: shipping.clone(),
            payment_status: PaymentStatus::Pending,
            order_status: OrderStatus::Pending,
            payment_method,
            transaction_id: None,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, user_id, total_amount_cents,
                shipping_name, shipping_address, shipping_city,
                shipping_state, shipping_pincode, shipping_phone,
                payment_status, order_status, payment_method, transaction_id,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&order.id)
        .bind(&order.user_id)
        .bind(order.total_amount_cents)
        .bind(&order.shipping_address.name)
        .bind(&order.shipping_address.address)
        .bind(&order.shipping_address.city)
        .bind(&order.shipping_address.state)
        .bind(&order.shipping_address.pincode)
        .bind(&order.shipping_address.phone)
        .bind(order.payment_status)
        .bind(order.order_status)
        .bind(order.payment_method)
        .bind(&order.transaction_id)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await?;

        for item in &order.items {
            sqlx::query(
                r#"
                INSERT INTO order_items (
                    id, order_id, product_id, name_snapshot, unit_price_cents, quantity
                ) VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&item.id)
            .bind(&item.order_id)
            .bind(&item.product_id)
            .bind(&item.name_snapshot)
            .bind(item.unit_price_cents)
            .bind(item.quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            order_id = %order.id,
            total = %order.total(),
            "Order placed"
        );

        Ok(order)
    }

    /// Gets an order with its items.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders o WHERE o.id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(self.attach_items(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    /// A customer's orders, newest first.
    pub async fn list_for_user(&self, user_id: &str) -> DbResult<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders o WHERE o.user_id = ? \
             ORDER BY o.created_at DESC, o.rowid DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        self.attach_items(rows).await
    }

    /// Every order with its customer's name and email, newest first.
    /// `limit` caps the number returned (dashboard "recent orders").
    pub async fn list_all_with_customer(&self, limit: Option<i64>) -> DbResult<Vec<OrderWithCustomer>> {
        let mut builder = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {ORDER_COLUMNS}, \
             COALESCE(u.name, '') AS customer_name, \
             COALESCE(u.email, '') AS customer_email \
             FROM orders o LEFT JOIN users u ON u.id = o.user_id \
             ORDER BY o.created_at DESC, o.rowid DESC"
        ));
        if let Some(limit) = limit {
            builder.push(" LIMIT ").push_bind(limit);
        }

        let rows = builder
            .build_query_as::<CustomerOrderRow>()
            .fetch_all(&self.pool)
            .await?;

        let mut customers = Vec::with_capacity(rows.len());
        let mut order_rows = Vec::with_capacity(rows.len());
        for row in rows {
            customers.push((row.customer_name, row.customer_email));
            order_rows.push(row.order);
        }

        let orders = self.attach_items(order_rows).await?;

        Ok(orders
            .into_iter()
            .zip(customers)
            .map(|(order, (customer_name, customer_email))| OrderWithCustomer {
                order,
                customer_name,
                customer_email,
            })
            .collect())
    }

    /// Applies an admin status edit and returns the updated order.
    ///
    /// ## Errors
    /// - `NotFound` for an unknown order
    /// - `Domain(InvalidStatusTransition)` for an illegal status change
    pub async fn update_status(&self, order_id: &str, update: OrderStatusUpdate) -> DbResult<Order> {
        debug!(
            order_id = %order_id,
            order_status = ?update.order_status,
            payment_status = ?update.payment_status,
            "Updating order status"
        );

        let mut tx = self.pool.begin().await?;

        let current: OrderStatus =
            sqlx::query_scalar("SELECT order_status FROM orders WHERE id = ?")
                .bind(order_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| DbError::not_found("Order", order_id))?;

        if let Some(next) = update.order_status {
            transition(current, next)?;

            if current.restocks_on(next) {
                let restocked = sqlx::query(
                    r#"
                    UPDATE products
                    SET
                        stock = stock + (
                            SELECT SUM(oi.quantity) FROM order_items oi
                            WHERE oi.order_id = ? AND oi.product_id = products.id
                        ),
                        updated_at = ?
                    WHERE id IN (SELECT product_id FROM order_items WHERE order_id = ?)
                    "#,
                )
                .bind(order_id)
                .bind(Utc::now())
                .bind(order_id)
                .execute(&mut *tx)
                .await?;

                info!(
                    order_id = %order_id,
                    products = restocked.rows_affected(),
                    "Cancelled order restocked"
                );
            }
        }

        sqlx::query(
            r#"
            UPDATE orders
            SET
                order_status = COALESCE(?, order_status),
                payment_status = COALESCE(?, payment_status),
                transaction_id = COALESCE(?, transaction_id),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(update.order_status)
        .bind(update.payment_status)
        .bind(&update.transaction_id)
        .bind(Utc::now())
        .bind(order_id)
        .execute(&mut *tx)
        .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        self.get_by_id(order_id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", order_id))
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Loads the items of every row in one query and builds the orders,
    /// preserving row order.
    async fn attach_items(&self, rows: Vec<OrderRow>) -> DbResult<Vec<Order>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder = QueryBuilder::<Sqlite>::new(
            "SELECT id, order_id, product_id, name_snapshot, unit_price_cents, quantity \
             FROM order_items WHERE order_id IN (",
        );
        let mut ids = builder.separated(", ");
        for row in &rows {
            ids.push_bind(row.id.clone());
        }
        builder.push(") ORDER BY rowid");

        let items = builder
            .build_query_as::<OrderItem>()
            .fetch_all(&self.pool)
            .await?;

        let mut by_order: HashMap<String, Vec<OrderItem>> = HashMap::new();
        for item in items {
            by_order.entry(item.order_id.clone()).or_default().push(item);
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let items = by_order.remove(&row.id).unwrap_or_default();
                row.into_order(items)
            })
            .collect())
    }
}
