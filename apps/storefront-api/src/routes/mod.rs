//! # HTTP Routes
//!
//! One module per resource. Handlers are plain async functions so tests can
//! call them directly with hand-built extractors.
//!
//! | Module       | Paths                                      | Auth  |
//! |--------------|--------------------------------------------|-------|
//! | `health`     | `/health`                                  | -     |
//! | `auth`       | `/register`, `/login`, `/profile`          | mixed |
//! | `products`   | `/products/...`                            | -     |
//! | `orders`     | `/orders`                                  | user  |
//! | `reviews`    | `/reviews`                                 | user  |
//! | `wishlist`   | `/wishlist/...`                            | user  |
//! | `admin`      | `/admin/...`                               | admin |

pub mod admin;
pub mod auth;
pub mod health;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod wishlist;

use std::sync::Arc;

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::error::ApiError;
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health))
        // Accounts
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/profile", get(auth::get_profile).put(auth::update_profile))
        // Catalog
        .route("/products", get(products::list_products))
        .route("/products/search", get(products::search_products))
        .route("/products/category/{category}", get(products::list_by_category))
        .route("/products/{id}", get(products::get_product))
        .route("/products/{id}/reviews", get(products::list_reviews))
        // Shopping
        .route("/orders", get(orders::list_orders).post(orders::create_order))
        .route("/reviews", post(reviews::create_review))
        .route("/wishlist", get(wishlist::list_wishlist).post(wishlist::add_to_wishlist))
        .route("/wishlist/{product_id}", delete(wishlist::remove_from_wishlist))
        // Admin
        .route("/admin/stats", get(admin::stats))
        .route("/admin/dashboard", get(admin::dashboard))
        .route("/admin/users", get(admin::list_users))
        .route("/admin/users/{id}", put(admin::update_user_role))
        .route("/admin/products", get(admin::list_products).post(admin::create_product))
        .route(
            "/admin/products/{id}",
            put(admin::update_product).delete(admin::delete_product),
        )
        .route("/admin/orders", get(admin::list_orders))
        .route("/admin/orders/{id}", put(admin::update_order))
}

/// Fallback for unmatched paths.
pub async fn not_found() -> ApiError {
    ApiError::not_found("Route not found")
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use serde_json::Value;
    use storefront_core::Role;
    use tower::ServiceExt;

    use crate::build_router;
    use crate::test_support::{create_account, create_product, test_state};

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn get(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_unknown_path_falls_back() {
        let app = build_router(test_state().await);

        let (status, body) = send(app, get("/no/such/route", None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "NOT_FOUND");
        assert_eq!(body["message"], "Route not found");
    }

    #[tokio::test]
    async fn test_malformed_json_body() {
        let app = build_router(test_state().await);
        let request = Request::builder()
            .method("POST")
            .uri("/register")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from("{\"name\": \"Asha\","))
            .unwrap();

        let (status, body) = send(app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert!(body["message"]
            .as_str()
            .unwrap()
            .starts_with("Invalid request body"));
    }

    #[tokio::test]
    async fn test_product_paths() {
        let state = test_state().await;
        let saree = create_product(&state, "Silk Saree", 499_900, 5).await;
        let app = build_router(state);

        let (status, body) = send(app.clone(), get(&format!("/products/{}", saree.id), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["product"]["id"], saree.id.as_str());
        assert_eq!(body["product"]["priceCents"], 499_900);

        let (status, body) = send(
            app.clone(),
            get(&format!("/products/{}/reviews", saree.id), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 0);

        let (status, body) = send(app.clone(), get("/products/category/saree", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["products"][0]["name"], "Silk Saree");

        let (status, body) = send(app.clone(), get("/products/missing", None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Product not found");

        let (status, _) = send(app, get("/products/search?page=9223372036854775807", None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_bearer_header_checks() {
        let state = test_state().await;
        let (_, admin_token) = create_account(&state, "admin@example.com", Role::Admin).await;
        let (_, user_token) = create_account(&state, "asha@example.com", Role::User).await;
        let app = build_router(state);

        let (status, body) = send(app.clone(), get("/admin/stats", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Access token required");

        let (status, body) = send(app.clone(), get("/admin/stats", Some("not-a-jwt"))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "Invalid or expired token");

        let (status, body) = send(app.clone(), get("/admin/stats", Some(&user_token))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "Access denied. Admin only.");

        let (status, body) = send(app.clone(), get("/admin/stats", Some(&admin_token))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["stats"]["totalUsers"], 2);

        let request = Request::builder()
            .method("DELETE")
            .uri("/wishlist/some-product")
            .header(AUTHORIZATION, "Basic dXNlcjpwYXNz")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(app, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Access token required");
    }
}
