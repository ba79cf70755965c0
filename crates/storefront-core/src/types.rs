//! # Domain Types
//!
//! Core domain types used throughout the storefront.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      User       │   │     Product     │   │      Order      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  email (unique) │   │  category       │   │  user_id (ref)  │       │
//! │  │  role           │   │  price_cents    │   │  items[]        │       │
//! │  │  password_hash  │   │  stock          │   │  order_status   │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │     Review      │   │  WishlistEntry  │                             │
//! │  │  ─────────────  │   │  ─────────────  │                             │
//! │  │  (user,product) │   │  (user,product) │                             │
//! │  │  rating 1..=5   │   │  added_at       │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! References between records are by id only; the database layer decides
//! which of them are enforced with foreign keys.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::order_total;
use crate::error::{CoreResult, ValidationError};
use crate::money::Money;

/// Parses `value` against the string names of `all`.
fn parse_named<T: Copy>(
    field: &str,
    value: &str,
    all: &[T],
    name: fn(&T) -> &'static str,
) -> Result<T, ValidationError> {
    let value = value.trim().to_ascii_lowercase();
    all.iter()
        .find(|candidate| name(candidate) == value)
        .copied()
        .ok_or_else(|| ValidationError::NotAllowed {
            field: field.to_string(),
            allowed: all.iter().map(|c| name(c).to_string()).collect(),
        })
}

// =============================================================================
// Role
// =============================================================================

/// What a user account is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular shopper.
    #[default]
    User,
    /// Store administrator (dashboard, catalog, order management).
    Admin,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::User, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    #[inline]
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_named("role", s, &Role::ALL, Role::as_str)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// User
// =============================================================================

/// A registered account.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct User {
    pub id: String,
    pub name: String,
    /// Always stored trimmed and lowercase.
    pub email: String,
    /// Argon2 PHC string. Never leaves the server.
    #[serde(skip_serializing, default)]
    #[ts(skip)]
    pub password_hash: String,
    pub role: Role,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl User {
    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

// =============================================================================
// Category
// =============================================================================

/// Catalog category. The storefront sells a fixed set of garment lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Saree,
    Kurta,
    Accessory,
    Jewelry,
    Footwear,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Saree,
        Category::Kurta,
        Category::Accessory,
        Category::Jewelry,
        Category::Footwear,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Saree => "saree",
            Category::Kurta => "kurta",
            Category::Accessory => "accessory",
            Category::Jewelry => "jewelry",
            Category::Footwear => "footwear",
        }
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_named("category", s, &Category::ALL, Category::as_str)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Product
// =============================================================================

/// A catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Price in minor units.
    pub price_cents: i64,
    /// Image reference understood by the SPA (asset key or URL).
    pub image: String,
    pub category: Category,
    /// Units on hand. Never negative.
    pub stock: i64,
    /// Sum of all review ratings; with `review_count` gives the average.
    pub rating_total: i64,
    pub review_count: i64,
    /// Soft-delete flag. Inactive products stay referenced by old orders.
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Average review rating, 0.0 when nobody has reviewed the product yet.
    pub fn rating(&self) -> f64 {
        if self.review_count == 0 {
            return 0.0;
        }
        self.rating_total as f64 / self.review_count as f64
    }

    /// Whether `quantity` units can be taken from stock.
    pub fn can_fulfil(&self, quantity: i64) -> bool {
        self.is_active && self.stock >= quantity
    }
}

// =============================================================================
// Order Enums
// =============================================================================

/// Where an order is in its fulfilment lifecycle.
///
/// Legal transitions live in [`crate::order_flow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl FromStr for OrderStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_named("orderStatus", s, &OrderStatus::ALL, OrderStatus::as_str)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the money for an order has arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Completed,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub const ALL: [PaymentStatus; 4] = [
        PaymentStatus::Pending,
        PaymentStatus::Completed,
        PaymentStatus::Failed,
        PaymentStatus::Refunded,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_named("paymentStatus", s, &PaymentStatus::ALL, PaymentStatus::as_str)
    }
}

/// How the customer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Cash on delivery.
    #[default]
    Cod,
    Card,
    Upi,
    Netbanking,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 4] = [
        PaymentMethod::Cod,
        PaymentMethod::Card,
        PaymentMethod::Upi,
        PaymentMethod::Netbanking,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cod => "cod",
            PaymentMethod::Card => "card",
            PaymentMethod::Upi => "upi",
            PaymentMethod::Netbanking => "netbanking",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_named("paymentMethod", s, &PaymentMethod::ALL, PaymentMethod::as_str)
    }
}

// =============================================================================
// Order
// =============================================================================

/// Delivery address captured at checkout. All fields are free text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct ShippingAddress {
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub phone: String,
}

/// A line of an order.
///
/// Uses the snapshot pattern: name and unit price are frozen at checkout so
/// later catalog edits do not rewrite order history.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    pub name_snapshot: String,
    pub unit_price_cents: i64,
    pub quantity: i64,
}

impl OrderItem {
    #[inline]
    pub fn line_total(&self) -> CoreResult<Money> {
        Money::from_cents(self.unit_price_cents).multiply_quantity(self.quantity)
    }
}

/// A placed order with its lines.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub items: Vec<OrderItem>,
    /// Always equals the sum of the items' line totals.
    pub total_amount_cents: i64,
    pub shipping_address: ShippingAddress,
    pub payment_status: PaymentStatus,
    pub order_status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub transaction_id: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Order {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_amount_cents)
    }

    /// Recomputes the total from the items.
    pub fn items_total(&self) -> CoreResult<Money> {
        order_total(
            self.items
                .iter()
                .map(|item| (Money::from_cents(item.unit_price_cents), item.quantity)),
        )
    }
}

// =============================================================================
// Review
// =============================================================================

/// A customer's rating of a product. At most one per (user, product).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Review {
    pub id: String,
    pub user_id: String,
    pub product_id: String,
    /// 1 to 5 inclusive.
    pub rating: i64,
    pub comment: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Wishlist
// =============================================================================

/// One product saved to a user's wishlist.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct WishlistEntry {
    pub user_id: String,
    pub product_id: String,
    #[ts(as = "String")]
    pub added_at: DateTime<Utc>,
}
