//! # Admin Routes
//!
//! Store management. Every handler takes [`AdminUser`], which re-reads the
//! caller's role from the database on each request.
//!
//! ## Order Status Update
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  PUT /admin/orders/{id} { orderStatus: "cancelled" }                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  order_flow::transition(current, next)                                 │
//! │       ├── illegal (e.g. delivered → pending) ──► 400                   │
//! │       └── legal                                                        │
//! │             │                                                           │
//! │             ▼                                                           │
//! │  → cancelled? restock every line, same transaction                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  { message: "Order status updated", order }                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use storefront_core::validation::{
    validate_description, validate_price_cents, validate_product_name, validate_stock,
};
use storefront_core::{Category, OrderStatus, PaymentStatus, Role, ValidationError, DEFAULT_STOCK};
use storefront_db::{NewProduct, OrderStatusUpdate, ProductUpdate};
use tracing::info;

use crate::auth::AdminUser;
use crate::dto::{
    minor_units, AdminOrderDto, DashboardDto, OrderDto, PopularProductDto, ProductDto, StatsDto,
    SummaryDto, UserDto,
};
use crate::error::{ApiError, ApiResult};
use crate::response::{Envelope, NoData};
use crate::AppState;

const RECENT_ORDERS: i64 = 10;
const POPULAR_PRODUCTS: i64 = 5;

// =============================================================================
// Request Bodies
// =============================================================================

/// Product fields from the admin form.
///
/// `price` is in major units as typed; `priceCents` wins when both are sent.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub price_cents: Option<i64>,
    pub image: Option<String>,
    pub category: Option<String>,
    pub stock: Option<i64>,
    pub is_active: Option<bool>,
}

impl ProductRequest {
    fn price_cents(&self) -> Result<Option<i64>, ValidationError> {
        let cents = match (self.price_cents, self.price) {
            (Some(cents), _) => Some(cents),
            (None, Some(price)) if price.is_finite() => Some(minor_units(price)),
            (None, Some(_)) => {
                return Err(ValidationError::InvalidFormat {
                    field: "price".to_string(),
                    reason: "must be a number".to_string(),
                })
            }
            (None, None) => None,
        };

        if let Some(cents) = cents {
            validate_price_cents(cents)?;
        }
        Ok(cents)
    }

    fn category(&self) -> Result<Option<Category>, ValidationError> {
        self.category.as_deref().map(str::parse::<Category>).transpose()
    }

    fn stock(&self) -> Result<Option<i64>, ValidationError> {
        if let Some(stock) = self.stock {
            validate_stock(stock)?;
        }
        Ok(self.stock)
    }

    fn into_new_product(self) -> Result<NewProduct, ValidationError> {
        let price_cents = self
            .price_cents()?
            .ok_or_else(|| ValidationError::required("price"))?;
        let category = self
            .category()?
            .ok_or_else(|| ValidationError::required("category"))?;
        let stock = self.stock()?.unwrap_or(DEFAULT_STOCK);

        Ok(NewProduct {
            name: validate_product_name(self.name.as_deref().unwrap_or_default())?,
            description: validate_description(self.description.as_deref().unwrap_or_default())?,
            price_cents,
            image: self.image.map(|i| i.trim().to_string()).unwrap_or_default(),
            category,
            stock,
        })
    }

    fn into_update(self) -> Result<ProductUpdate, ValidationError> {
        Ok(ProductUpdate {
            price_cents: self.price_cents()?,
            category: self.category()?,
            stock: self.stock()?,
            name: self.name.as_deref().map(validate_product_name).transpose()?,
            description: self
                .description
                .as_deref()
                .map(validate_description)
                .transpose()?,
            image: self.image.map(|i| i.trim().to_string()),
            is_active: self.is_active,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RoleRequest {
    pub role: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OrderUpdateRequest {
    #[serde(alias = "status")]
    pub order_status: Option<String>,
    pub payment_status: Option<String>,
    pub transaction_id: Option<String>,
}

impl OrderUpdateRequest {
    fn into_update(self) -> Result<OrderStatusUpdate, ValidationError> {
        Ok(OrderStatusUpdate {
            order_status: self
                .order_status
                .as_deref()
                .map(str::parse::<OrderStatus>)
                .transpose()?,
            payment_status: self
                .payment_status
                .as_deref()
                .map(str::parse::<PaymentStatus>)
                .transpose()?,
            transaction_id: self
                .transaction_id
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty()),
        })
    }
}

// =============================================================================
// Response Bodies
// =============================================================================

#[derive(Debug, Serialize)]
pub struct StatsBody {
    pub stats: StatsDto,
}

#[derive(Debug, Serialize)]
pub struct DashboardBody {
    pub dashboard: DashboardDto,
}

#[derive(Debug, Serialize)]
pub struct UserListBody {
    pub count: usize,
    pub users: Vec<UserDto>,
}

#[derive(Debug, Serialize)]
pub struct UserBody {
    pub user: UserDto,
}

#[derive(Debug, Serialize)]
pub struct ProductListBody {
    pub count: usize,
    pub products: Vec<ProductDto>,
}

#[derive(Debug, Serialize)]
pub struct ProductBody {
    pub product: ProductDto,
}

#[derive(Debug, Serialize)]
pub struct OrderListBody {
    pub count: usize,
    pub orders: Vec<AdminOrderDto>,
}

#[derive(Debug, Serialize)]
pub struct OrderBody {
    pub order: OrderDto,
}

// =============================================================================
// Dashboard
// =============================================================================

async fn recent_orders(state: &AppState) -> ApiResult<Vec<AdminOrderDto>> {
    Ok(state
        .db
        .stats()
        .recent_orders(RECENT_ORDERS)
        .await?
        .into_iter()
        .map(AdminOrderDto::from)
        .collect())
}

pub async fn stats(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> ApiResult<Envelope<StatsBody>> {
    let summary = state.db.stats().summary().await?;

    Ok(Envelope::ok(StatsBody {
        stats: StatsDto {
            summary: summary.into(),
            recent_orders: recent_orders(&state).await?,
        },
    }))
}

pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> ApiResult<Envelope<DashboardBody>> {
    let stats = state.db.stats();

    let summary: SummaryDto = stats.summary().await?.into();
    let popular_products = stats
        .popular_products(POPULAR_PRODUCTS)
        .await?
        .into_iter()
        .map(PopularProductDto::from)
        .collect();
    let order_status = stats.order_status_counts().await?;

    Ok(Envelope::ok(DashboardBody {
        dashboard: DashboardDto {
            stats: summary,
            popular_products,
            order_status,
            recent_orders: recent_orders(&state).await?,
        },
    }))
}

// =============================================================================
// Users
// =============================================================================

pub async fn list_users(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> ApiResult<Envelope<UserListBody>> {
    let users: Vec<UserDto> = state
        .db
        .users()
        .list()
        .await?
        .into_iter()
        .map(UserDto::from)
        .collect();

    Ok(Envelope::ok(UserListBody {
        count: users.len(),
        users,
    }))
}

/// Promotes or demotes an account. Admins cannot demote themselves, so the
/// store always keeps at least the caller as admin.
pub async fn update_user_role(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
    payload: Result<Json<RoleRequest>, JsonRejection>,
) -> ApiResult<Envelope<UserBody>> {
    let Json(req) = payload?;
    let role: Role = req.role.parse()?;

    if id == admin.id && !role.is_admin() {
        return Err(ApiError::validation("You cannot remove your own admin role"));
    }

    let user = state.db.users().update_role(&id, role).await?;
    info!(admin_id = %admin.id, user_id = %user.id, role = %role, "User role changed");

    Ok(Envelope::with_message("User role updated", UserBody { user: user.into() }))
}

// =============================================================================
// Catalog
// =============================================================================

/// The whole catalog, inactive products included.
pub async fn list_products(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> ApiResult<Envelope<ProductListBody>> {
    let products: Vec<ProductDto> = state
        .db
        .products()
        .list_all()
        .await?
        .into_iter()
        .map(ProductDto::from)
        .collect();

    Ok(Envelope::ok(ProductListBody {
        count: products.len(),
        products,
    }))
}

pub async fn create_product(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    payload: Result<Json<ProductRequest>, JsonRejection>,
) -> ApiResult<Envelope<ProductBody>> {
    let Json(req) = payload?;
    let new = req.into_new_product()?;

    let product = state.db.products().insert(new).await?;
    info!(admin_id = %admin.id, product_id = %product.id, "Product added");

    Ok(Envelope::created(
        "Product added successfully",
        ProductBody {
            product: product.into(),
        },
    ))
}

pub async fn update_product(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
    payload: Result<Json<ProductRequest>, JsonRejection>,
) -> ApiResult<Envelope<ProductBody>> {
    let Json(req) = payload?;
    let update = req.into_update()?;

    let product = state.db.products().update(&id, update).await?;
    info!(admin_id = %admin.id, product_id = %product.id, "Product updated");

    Ok(Envelope::with_message(
        "Product updated successfully",
        ProductBody {
            product: product.into(),
        },
    ))
}

/// Soft delete; existing orders keep their reference.
pub async fn delete_product(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
) -> ApiResult<Envelope<NoData>> {
    state.db.products().soft_delete(&id).await?;
    info!(admin_id = %admin.id, product_id = %id, "Product deactivated");

    Ok(Envelope::message("Product deleted successfully"))
}

// =============================================================================
// Orders
// =============================================================================

pub async fn list_orders(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> ApiResult<Envelope<OrderListBody>> {
    let orders: Vec<AdminOrderDto> = state
        .db
        .orders()
        .list_all_with_customer(None)
        .await?
        .into_iter()
        .map(AdminOrderDto::from)
        .collect();

    Ok(Envelope::ok(OrderListBody {
        count: orders.len(),
        orders,
    }))
}

pub async fn update_order(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
    payload: Result<Json<OrderUpdateRequest>, JsonRejection>,
) -> ApiResult<Envelope<OrderBody>> {
    let Json(req) = payload?;
    let update = req.into_update()?;

    if update.is_empty() {
        return Err(ApiError::validation("No changes provided for update"));
    }

    let order = state.db.orders().update_status(&id, update).await?;
    info!(
        admin_id = %admin.id,
        order_id = %order.id,
        order_status = %order.order_status,
        "Order status updated"
    );

    Ok(Envelope::with_message(
        "Order status updated",
        OrderBody {
            order: order.into(),
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::test_support::{admin_user, create_account, create_product as seed_product, test_state};
    use axum::http::StatusCode;
    use storefront_core::{Cart, CartLine, PaymentMethod, ShippingAddress, User};

    async fn setup() -> (Arc<AppState>, User) {
        let state = test_state().await;
        let (admin, _) = create_account(&state, "admin@example.com", Role::Admin).await;
        (state, admin)
    }

    async fn place(state: &AppState, user: &User, product_id: &str, quantity: i64) -> String {
        let cart = Cart::from_lines(vec![CartLine {
            product_id: product_id.to_string(),
            quantity,
        }])
        .unwrap();
        state
            .db
            .orders()
            .place_order(&user.id, &cart, &ShippingAddress::default(), PaymentMethod::Cod)
            .await
            .unwrap()
            .id
    }

    fn order_update(status: Option<&str>, payment: Option<&str>) -> OrderUpdateRequest {
        OrderUpdateRequest {
            order_status: status.map(str::to_string),
            payment_status: payment.map(str::to_string),
            transaction_id: None,
        }
    }

    #[tokio::test]
    async fn test_stats_and_dashboard() {
        let (state, admin) = setup().await;
        let (buyer, _) = create_account(&state, "buyer@example.com", Role::User).await;
        let saree = seed_product(&state, "Silk Saree", 100_000, 10).await;
        let order_id = place(&state, &buyer, &saree.id, 2).await;

        update_order(
            State(state.clone()),
            admin_user(&admin),
            Path(order_id),
            Ok(Json(order_update(Some("confirmed"), Some("completed")))),
        )
        .await
        .unwrap();

        let body = stats(State(state.clone()), admin_user(&admin)).await.unwrap();
        let stats = &body.data.stats;
        assert_eq!(stats.summary.total_users, 2);
        assert_eq!(stats.summary.total_orders, 1);
        assert_eq!(stats.summary.total_revenue_cents, 200_000);
        assert_eq!(stats.summary.total_revenue, 2000.0);
        assert_eq!(stats.recent_orders[0].customer.email, "buyer@example.com");

        let body = dashboard(State(state), admin_user(&admin)).await.unwrap();
        let dashboard = &body.data.dashboard;
        assert_eq!(dashboard.popular_products[0].total_sold, 2);
        assert_eq!(dashboard.order_status[0].status, OrderStatus::Confirmed);
        assert_eq!(dashboard.recent_orders.len(), 1);
    }

    #[tokio::test]
    async fn test_role_changes() {
        let (state, admin) = setup().await;
        let (buyer, _) = create_account(&state, "buyer@example.com", Role::User).await;

        let body = update_user_role(
            State(state.clone()),
            admin_user(&admin),
            Path(buyer.id.clone()),
            Ok(Json(RoleRequest {
                role: "admin".to_string(),
            })),
        )
        .await
        .unwrap();
        assert!(body.data.user.is_admin);

        let err = update_user_role(
            State(state.clone()),
            admin_user(&admin),
            Path(admin.id.clone()),
            Ok(Json(RoleRequest {
                role: "user".to_string(),
            })),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err = update_user_role(
            State(state.clone()),
            admin_user(&admin),
            Path("ghost".to_string()),
            Ok(Json(RoleRequest {
                role: "user".to_string(),
            })),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let body = list_users(State(state), admin_user(&admin)).await.unwrap();
        assert_eq!(body.data.count, 2);
    }

    #[tokio::test]
    async fn test_product_management() {
        let (state, admin) = setup().await;

        let body = create_product(
            State(state.clone()),
            admin_user(&admin),
            Ok(Json(ProductRequest {
                name: Some("Kolhapuri Chappal".to_string()),
                description: Some("Hand-stitched leather".to_string()),
                price: Some(1499.5),
                category: Some("footwear".to_string()),
                ..Default::default()
            })),
        )
        .await
        .unwrap();
        assert_eq!(body.status, StatusCode::CREATED);
        let product = body.data.product;
        assert_eq!(product.price_cents, 149_950);
        assert_eq!(product.stock, DEFAULT_STOCK);
        assert_eq!(product.category, Category::Footwear);

        let body = update_product(
            State(state.clone()),
            admin_user(&admin),
            Path(product.id.clone()),
            Ok(Json(ProductRequest {
                stock: Some(3),
                ..Default::default()
            })),
        )
        .await
        .unwrap();
        assert_eq!(body.data.product.stock, 3);
        assert_eq!(body.data.product.name, "Kolhapuri Chappal");

        delete_product(State(state.clone()), admin_user(&admin), Path(product.id.clone()))
            .await
            .unwrap();
        let body = list_products(State(state.clone()), admin_user(&admin)).await.unwrap();
        assert_eq!(body.data.count, 1);
        assert!(!body.data.products[0].is_active);

        let err = delete_product(State(state), admin_user(&admin), Path("ghost".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_product_validation() {
        let (state, admin) = setup().await;

        let err = create_product(
            State(state.clone()),
            admin_user(&admin),
            Ok(Json(ProductRequest {
                name: Some("Scarf".to_string()),
                description: Some("Wool".to_string()),
                category: Some("accessory".to_string()),
                ..Default::default()
            })),
        )
        .await
        .unwrap_err();
        assert_eq!(err.message, "price is required");

        let err = create_product(
            State(state.clone()),
            admin_user(&admin),
            Ok(Json(ProductRequest {
                name: Some("Scarf".to_string()),
                description: Some("Wool".to_string()),
                price_cents: Some(-5),
                category: Some("accessory".to_string()),
                ..Default::default()
            })),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = create_product(
            State(state.clone()),
            admin_user(&admin),
            Ok(Json(ProductRequest {
                name: Some("Scarf".to_string()),
                description: Some("Wool".to_string()),
                price: Some(1e300),
                category: Some("accessory".to_string()),
                ..Default::default()
            })),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "price must be between 0 and 1000000000");
        assert_eq!(state.db.products().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_order_status_updates() {
        let (state, admin) = setup().await;
        let (buyer, _) = create_account(&state, "buyer@example.com", Role::User).await;
        let saree = seed_product(&state, "Silk Saree", 100_000, 10).await;
        let order_id = place(&state, &buyer, &saree.id, 4).await;

        let err = update_order(
            State(state.clone()),
            admin_user(&admin),
            Path(order_id.clone()),
            Ok(Json(order_update(None, None))),
        )
        .await
        .unwrap_err();
        assert_eq!(err.message, "No changes provided for update");

        let body = update_order(
            State(state.clone()),
            admin_user(&admin),
            Path(order_id.clone()),
            Ok(Json(order_update(Some("cancelled"), None))),
        )
        .await
        .unwrap();
        assert_eq!(body.data.order.order_status, OrderStatus::Cancelled);

        let saree = state.db.products().get_by_id(&saree.id).await.unwrap().unwrap();
        assert_eq!(saree.stock, 10);

        let err = update_order(
            State(state.clone()),
            admin_user(&admin),
            Path(order_id),
            Ok(Json(order_update(Some("shipped"), None))),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidTransition);

        let body = list_orders(State(state), admin_user(&admin)).await.unwrap();
        assert_eq!(body.data.count, 1);
        assert_eq!(body.data.orders[0].customer.email, "buyer@example.com");
    }
}
