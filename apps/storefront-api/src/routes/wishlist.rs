//! Wishlist routes.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::AuthUser;
use crate::dto::ProductDto;
use crate::error::{ApiError, ApiResult};
use crate::response::{Envelope, NoData};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WishlistRequest {
    pub product_id: String,
}

#[derive(Debug, Serialize)]
pub struct WishlistBody {
    pub count: usize,
    pub products: Vec<ProductDto>,
}

pub async fn list_wishlist(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> ApiResult<Envelope<WishlistBody>> {
    let products: Vec<ProductDto> = state
        .db
        .wishlist()
        .list_products(&auth.user_id)
        .await?
        .into_iter()
        .map(ProductDto::from)
        .collect();

    Ok(Envelope::ok(WishlistBody {
        count: products.len(),
        products,
    }))
}

pub async fn add_to_wishlist(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    payload: Result<Json<WishlistRequest>, JsonRejection>,
) -> ApiResult<Envelope<NoData>> {
    let Json(req) = payload?;
    let product_id = req.product_id.trim();

    if product_id.is_empty() {
        return Err(ApiError::validation("productId is required"));
    }

    state.db.wishlist().add(&auth.user_id, product_id).await?;
    info!(user_id = %auth.user_id, product_id = %product_id, "Added to wishlist");

    Ok(Envelope::message("Product added to wishlist"))
}

pub async fn remove_from_wishlist(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(product_id): Path<String>,
) -> ApiResult<Envelope<NoData>> {
    state.db.wishlist().remove(&auth.user_id, &product_id).await?;
    info!(user_id = %auth.user_id, product_id = %product_id, "Removed from wishlist");

    Ok(Envelope::message("Product removed from wishlist"))
}
