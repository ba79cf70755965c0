//! # Response DTOs
//!
//! Wire shapes for the SPA. Domain types stay internal; these carry camelCase
//! names, hide password hashes, and expose prices in both minor units and
//! major units (`price`, `totalAmount`) since the SPA renders the latter.

use chrono::{DateTime, Utc};
use serde::Serialize;
use storefront_core::{
    Category, Order, OrderItem, OrderStatus, PaymentMethod, PaymentStatus, Product, Role,
    ShippingAddress, User,
};
use storefront_db::{OrderWithCustomer, PopularProduct, ReviewWithAuthor, StatusCount, StoreSummary};

/// Minor units to a major-unit amount for display.
pub fn major_units(cents: i64) -> f64 {
    cents as f64 / 100.0
}

/// Major-unit amount from a query string to minor units, rounded.
pub fn minor_units(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserDto {
    fn from(u: User) -> Self {
        UserDto {
            is_admin: u.is_admin(),
            id: u.id,
            name: u.name,
            email: u.email,
            role: u.role,
            created_at: u.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub price_cents: i64,
    pub image: String,
    pub category: Category,
    pub stock: i64,
    /// Average rating, 0 when unreviewed.
    pub rating: f64,
    pub review_count: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Product> for ProductDto {
    fn from(p: Product) -> Self {
        ProductDto {
            rating: p.rating(),
            price: major_units(p.price_cents),
            id: p.id,
            name: p.name,
            description: p.description,
            price_cents: p.price_cents,
            image: p.image,
            category: p.category,
            stock: p.stock,
            review_count: p.review_count,
            is_active: p.is_active,
            created_at: p.created_at,
        }
    }
}

/// Order line as frozen at checkout.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemDto {
    pub product_id: String,
    pub name: String,
    pub price: f64,
    pub price_cents: i64,
    pub quantity: i64,
}

impl From<OrderItem> for OrderItemDto {
    fn from(item: OrderItem) -> Self {
        OrderItemDto {
            price: major_units(item.unit_price_cents),
            product_id: item.product_id,
            name: item.name_snapshot,
            price_cents: item.unit_price_cents,
            quantity: item.quantity,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDto {
    pub id: String,
    pub user_id: String,
    pub items: Vec<OrderItemDto>,
    pub total_amount: f64,
    pub total_amount_cents: i64,
    pub shipping_address: ShippingAddress,
    pub payment_status: PaymentStatus,
    pub order_status: OrderStatus,
    pub payment_method: PaymentMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Order> for OrderDto {
    fn from(o: Order) -> Self {
        OrderDto {
            id: o.id,
            user_id: o.user_id,
            items: o.items.into_iter().map(OrderItemDto::from).collect(),
            total_amount: major_units(o.total_amount_cents),
            total_amount_cents: o.total_amount_cents,
            shipping_address: o.shipping_address,
            payment_status: o.payment_status,
            order_status: o.order_status,
            payment_method: o.payment_method,
            transaction_id: o.transaction_id,
            created_at: o.created_at,
            updated_at: o.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomerDto {
    pub name: String,
    pub email: String,
}

/// Order as the admin screens see it, with the customer attached.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminOrderDto {
    #[serde(flatten)]
    pub order: OrderDto,
    pub customer: CustomerDto,
}

impl From<OrderWithCustomer> for AdminOrderDto {
    fn from(o: OrderWithCustomer) -> Self {
        AdminOrderDto {
            order: o.order.into(),
            customer: CustomerDto {
                name: o.customer_name,
                email: o.customer_email,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDto {
    pub id: String,
    pub product_id: String,
    pub user_id: String,
    pub user_name: String,
    pub rating: i64,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl From<ReviewWithAuthor> for ReviewDto {
    fn from(r: ReviewWithAuthor) -> Self {
        ReviewDto {
            id: r.review.id,
            product_id: r.review.product_id,
            user_id: r.review.user_id,
            user_name: r.user_name,
            rating: r.review.rating,
            comment: r.review.comment,
            created_at: r.review.created_at,
        }
    }
}

/// Headline numbers for the admin screens.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryDto {
    pub total_users: i64,
    pub total_products: i64,
    pub total_orders: i64,
    pub total_revenue: f64,
    pub total_revenue_cents: i64,
}

impl From<StoreSummary> for SummaryDto {
    fn from(s: StoreSummary) -> Self {
        SummaryDto {
            total_users: s.total_users,
            total_products: s.total_products,
            total_orders: s.total_orders,
            total_revenue: major_units(s.total_revenue_cents),
            total_revenue_cents: s.total_revenue_cents,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsDto {
    #[serde(flatten)]
    pub summary: SummaryDto,
    pub recent_orders: Vec<AdminOrderDto>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopularProductDto {
    pub product: ProductDto,
    pub total_sold: i64,
}

impl From<PopularProduct> for PopularProductDto {
    fn from(p: PopularProduct) -> Self {
        PopularProductDto {
            product: p.product.into(),
            total_sold: p.total_sold,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardDto {
    pub stats: SummaryDto,
    pub popular_products: Vec<PopularProductDto>,
    pub order_status: Vec<StatusCount>,
    pub recent_orders: Vec<AdminOrderDto>,
}
