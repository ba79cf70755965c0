//! # Order Routes
//!
//! Checkout and order history for the signed-in customer.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  POST /orders { items: [{ productId, quantity }], shippingAddress, ... }│
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Cart::from_lines ── merge duplicate lines, validate quantities        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  OrderRepository::place_order (one transaction)                        │
//! │       ├── product missing/inactive ──► 404 "Product not found: {id}"   │
//! │       ├── stock short ───────────────► 400 "Insufficient stock for …"  │
//! │       └── OK ──► stock decremented, prices snapshotted                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  201 { order }                                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Client-sent prices and totals are ignored; the server prices every line.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use storefront_core::{Cart, CartLine, PaymentMethod, ShippingAddress};
use tracing::info;

use crate::auth::AuthUser;
use crate::dto::OrderDto;
use crate::error::ApiResult;
use crate::response::Envelope;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub items: Vec<CartLine>,
    pub shipping_address: ShippingAddress,
    /// Defaults to cash on delivery.
    pub payment_method: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OrderBody {
    pub order: OrderDto,
}

#[derive(Debug, Serialize)]
pub struct OrderListBody {
    pub count: usize,
    pub orders: Vec<OrderDto>,
}

pub async fn create_order(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> ApiResult<Envelope<OrderBody>> {
    let Json(req) = payload?;

    let cart = Cart::from_lines(req.items)?;

    let payment_method = match req.payment_method.as_deref().map(str::trim) {
        None | Some("") => PaymentMethod::default(),
        Some(raw) => raw.parse::<PaymentMethod>()?,
    };

    let order = state
        .db
        .orders()
        .place_order(&auth.user_id, &cart, &req.shipping_address, payment_method)
        .await?;

    info!(order_id = %order.id, user_id = %auth.user_id, "Order created");

    Ok(Envelope::created(
        "Order created successfully",
        OrderBody {
            order: order.into(),
        },
    ))
}

/// The caller's orders, newest first.
pub async fn list_orders(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> ApiResult<Envelope<OrderListBody>> {
    let orders: Vec<OrderDto> = state
        .db
        .orders()
        .list_for_user(&auth.user_id)
        .await?
        .into_iter()
        .map(OrderDto::from)
        .collect();

    Ok(Envelope::ok(OrderListBody {
        count: orders.len(),
        orders,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::test_support::{auth_user, create_account, create_product, test_state};
    use axum::http::StatusCode;
    use storefront_core::{OrderStatus, Role};

    fn line(product_id: &str, quantity: i64) -> CartLine {
        CartLine {
            product_id: product_id.to_string(),
            quantity,
        }
    }

    fn request(items: Vec<CartLine>) -> CreateOrderRequest {
        CreateOrderRequest {
            items,
            shipping_address: ShippingAddress {
                name: "Asha".to_string(),
                city: "Jaipur".to_string(),
                ..Default::default()
            },
            payment_method: Some("upi".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_order_prices_on_server() {
        let state = test_state().await;
        let (user, _) = create_account(&state, "asha@example.com", Role::User).await;
        let saree = create_product(&state, "Silk Saree", 250_000, 5).await;
        let kurta = create_product(&state, "Cotton Kurta", 80_000, 5).await;

        let body = create_order(
            State(state.clone()),
            auth_user(&user),
            Ok(Json(request(vec![
                line(&saree.id, 1),
                line(&kurta.id, 2),
                line(&saree.id, 1),
            ]))),
        )
        .await
        .unwrap();

        assert_eq!(body.status, StatusCode::CREATED);
        let order = &body.data.order;
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.total_amount_cents, 660_000);
        assert_eq!(order.total_amount, 6600.0);
        assert_eq!(order.order_status, OrderStatus::Pending);
        assert_eq!(order.payment_method, PaymentMethod::Upi);
        assert_eq!(order.shipping_address.city, "Jaipur");

        let saree = state.db.products().get_by_id(&saree.id).await.unwrap().unwrap();
        assert_eq!(saree.stock, 3);
    }

    #[tokio::test]
    async fn test_create_order_failures_leave_stock() {
        let state = test_state().await;
        let (user, _) = create_account(&state, "asha@example.com", Role::User).await;
        let saree = create_product(&state, "Silk Saree", 250_000, 1).await;

        let err = create_order(
            State(state.clone()),
            auth_user(&user),
            Ok(Json(request(vec![line(&saree.id, 2)]))),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert_eq!(err.message, "Insufficient stock for Silk Saree");

        let err = create_order(
            State(state.clone()),
            auth_user(&user),
            Ok(Json(request(vec![line(&saree.id, 1), line("no-such-product", 1)]))),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.message, "Product not found: no-such-product");

        let err = create_order(State(state.clone()), auth_user(&user), Ok(Json(request(vec![]))))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let saree = state.db.products().get_by_id(&saree.id).await.unwrap().unwrap();
        assert_eq!(saree.stock, 1);
        assert!(state.db.orders().list_for_user(&user.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_order_total_overflow_is_rejected() {
        let state = test_state().await;
        let (user, _) = create_account(&state, "asha@example.com", Role::User).await;
        // Stored directly; the admin API caps prices well below this.
        let gown = create_product(&state, "Couture Gown", 100_000_000_000_000_000, 99).await;

        let err = create_order(
            State(state.clone()),
            auth_user(&user),
            Ok(Json(request(vec![line(&gown.id, 99)]))),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Order total is too large");

        let gown = state.db.products().get_by_id(&gown.id).await.unwrap().unwrap();
        assert_eq!(gown.stock, 99);
        assert!(state.db.orders().list_for_user(&user.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rejects_unknown_payment_method() {
        let state = test_state().await;
        let (user, _) = create_account(&state, "asha@example.com", Role::User).await;
        let saree = create_product(&state, "Silk Saree", 250_000, 1).await;

        let mut req = request(vec![line(&saree.id, 1)]);
        req.payment_method = Some("bitcoin".to_string());

        let err = create_order(State(state), auth_user(&user), Ok(Json(req)))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_list_orders_only_own() {
        let state = test_state().await;
        let (asha, _) = create_account(&state, "asha@example.com", Role::User).await;
        let (ravi, _) = create_account(&state, "ravi@example.com", Role::User).await;
        let saree = create_product(&state, "Silk Saree", 250_000, 10).await;

        for _ in 0..2 {
            create_order(
                State(state.clone()),
                auth_user(&asha),
                Ok(Json(request(vec![line(&saree.id, 1)]))),
            )
            .await
            .unwrap();
        }

        let body = list_orders(State(state.clone()), auth_user(&asha)).await.unwrap();
        assert_eq!(body.data.count, 2);

        let body = list_orders(State(state), auth_user(&ravi)).await.unwrap();
        assert!(body.data.orders.is_empty());
    }
}
