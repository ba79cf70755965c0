//! # Catalog Routes
//!
//! Public, read-only views of the active catalog.
//!
//! ## Search Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  GET /products/search?query=silk&category=saree&minPrice=500&page=2     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  parse + validate params (prices arrive in major units → ×100)          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ProductRepository::search ── one page + total match count              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  { products, total, totalPages, currentPage }                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};
use storefront_core::validation::{validate_limit, validate_page, validate_search_query};
use storefront_core::{Category, ValidationError, MAX_PRICE_CENTS};
use storefront_db::{ProductQuery, ProductSort};
use tracing::debug;

use crate::dto::{minor_units, ProductDto, ReviewDto};
use crate::error::{ApiError, ApiResult};
use crate::response::Envelope;
use crate::AppState;

const DEFAULT_PAGE_SIZE: i64 = 12;

/// Raw query string. Everything arrives as text so bad numbers become a
/// 400 with a useful message instead of an extractor rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchParams {
    pub query: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub sort_by: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl SearchParams {
    fn into_query(self) -> Result<ProductQuery, ValidationError> {
        let text = match self.query {
            Some(q) => Some(validate_search_query(&q)?).filter(|q| !q.is_empty()),
            None => None,
        };

        let category = match self.category.as_deref().map(str::trim) {
            None | Some("") | Some("all") => None,
            Some(raw) => Some(raw.parse::<Category>()?),
        };

        let page = parse_number("page", self.page.as_deref(), 1)?;
        validate_page(page)?;

        let limit = parse_number("limit", self.limit.as_deref(), DEFAULT_PAGE_SIZE)?;
        validate_limit(limit)?;

        Ok(ProductQuery {
            text,
            category,
            min_price_cents: parse_price("minPrice", self.min_price.as_deref())?,
            max_price_cents: parse_price("maxPrice", self.max_price.as_deref())?,
            sort: ProductSort::from_param(self.sort_by.as_deref()),
            page,
            limit,
        })
    }
}

fn parse_number(field: &str, raw: Option<&str>, default: i64) -> Result<i64, ValidationError> {
    match raw.map(str::trim).filter(|r| !r.is_empty()) {
        None => Ok(default),
        Some(r) => r.parse().map_err(|_| ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must be a whole number".to_string(),
        }),
    }
}

/// Major-unit price filter to minor units.
fn parse_price(field: &str, raw: Option<&str>) -> Result<Option<i64>, ValidationError> {
    let Some(r) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return Ok(None);
    };

    let amount: f64 = r
        .parse()
        .ok()
        .filter(|a: &f64| a.is_finite())
        .ok_or_else(|| ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must be a number".to_string(),
        })?;

    if amount < 0.0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }

    let cents = minor_units(amount);
    if cents > MAX_PRICE_CENTS {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_PRICE_CENTS / 100,
        });
    }

    Ok(Some(cents))
}

#[derive(Debug, Serialize)]
pub struct ProductListBody {
    pub count: usize,
    pub products: Vec<ProductDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchBody {
    pub products: Vec<ProductDto>,
    pub total: i64,
    pub total_pages: i64,
    pub current_page: i64,
}

#[derive(Debug, Serialize)]
pub struct ProductBody {
    pub product: ProductDto,
}

#[derive(Debug, Serialize)]
pub struct ReviewListBody {
    pub count: usize,
    pub reviews: Vec<ReviewDto>,
}

fn product_list(products: Vec<storefront_core::Product>) -> ProductListBody {
    let products: Vec<ProductDto> = products.into_iter().map(ProductDto::from).collect();
    ProductListBody {
        count: products.len(),
        products,
    }
}

/// Every active product, newest first.
pub async fn list_products(State(state): State<Arc<AppState>>) -> ApiResult<Envelope<ProductListBody>> {
    let products = state.db.products().list_active().await?;
    debug!(count = products.len(), "Listing products");
    Ok(Envelope::ok(product_list(products)))
}

pub async fn search_products(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Envelope<SearchBody>> {
    let query = params.into_query()?;

    if let (Some(min), Some(max)) = (query.min_price_cents, query.max_price_cents) {
        if min > max {
            return Err(ApiError::validation("minPrice cannot be greater than maxPrice"));
        }
    }

    let (products, total) = state.db.products().search(&query).await?;
    let total_pages = (total + query.limit - 1) / query.limit;

    debug!(total, page = query.page, "Product search");

    Ok(Envelope::ok(SearchBody {
        products: products.into_iter().map(ProductDto::from).collect(),
        total,
        total_pages,
        current_page: query.page,
    }))
}

pub async fn list_by_category(
    State(state): State<Arc<AppState>>,
    Path(category): Path<String>,
) -> ApiResult<Envelope<ProductListBody>> {
    let category: Category = category.parse()?;
    let products = state.db.products().list_by_category(category).await?;
    Ok(Envelope::ok(product_list(products)))
}

pub async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Envelope<ProductBody>> {
    let product = state
        .db
        .products()
        .get_active(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product not found"))?;

    Ok(Envelope::ok(ProductBody {
        product: product.into(),
    }))
}

/// Reviews of one product, newest first.
pub async fn list_reviews(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Envelope<ReviewListBody>> {
    if state.db.products().get_active(&id).await?.is_none() {
        return Err(ApiError::not_found("Product not found"));
    }

    let reviews: Vec<ReviewDto> = state
        .db
        .reviews()
        .list_for_product(&id)
        .await?
        .into_iter()
        .map(ReviewDto::from)
        .collect();

    Ok(Envelope::ok(ReviewListBody {
        count: reviews.len(),
        reviews,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::test_support::{create_account, create_product, test_state};
    use axum::http::StatusCode;
    use storefront_core::Role;
    use storefront_db::ProductUpdate;

    fn params(pairs: &[(&str, &str)]) -> SearchParams {
        let mut p = SearchParams::default();
        for (key, value) in pairs {
            let value = Some(value.to_string());
            match *key {
                "query" => p.query = value,
                "category" => p.category = value,
                "minPrice" => p.min_price = value,
                "maxPrice" => p.max_price = value,
                "sortBy" => p.sort_by = value,
                "page" => p.page = value,
                "limit" => p.limit = value,
                other => panic!("unknown param {other}"),
            }
        }
        p
    }

    #[test]
    fn test_params_parsing() {
        let query = params(&[
            ("query", "  silk "),
            ("category", "Saree"),
            ("minPrice", "10.5"),
            ("sortBy", "price_desc"),
            ("page", "2"),
        ])
        .into_query()
        .unwrap();

        assert_eq!(query.text.as_deref(), Some("silk"));
        assert_eq!(query.category, Some(Category::Saree));
        assert_eq!(query.min_price_cents, Some(1050));
        assert_eq!(query.max_price_cents, None);
        assert_eq!(query.sort, ProductSort::PriceDesc);
        assert_eq!(query.page, 2);
        assert_eq!(query.limit, 12);

        let query = params(&[("category", "all"), ("query", "   ")]).into_query().unwrap();
        assert_eq!(query.category, None);
        assert_eq!(query.text, None);
    }

    #[test]
    fn test_params_rejects_garbage() {
        assert!(params(&[("page", "0")]).into_query().is_err());
        assert!(params(&[("page", "two")]).into_query().is_err());
        assert!(params(&[("limit", "500")]).into_query().is_err());
        assert!(params(&[("minPrice", "-1")]).into_query().is_err());
        assert!(params(&[("maxPrice", "cheap")]).into_query().is_err());
        assert!(params(&[("category", "electronics")]).into_query().is_err());
        assert!(params(&[("maxPrice", "1e300")]).into_query().is_err());
    }

    #[tokio::test]
    async fn test_search_rejects_huge_page() {
        let state = test_state().await;
        create_product(&state, "Silk Saree", 499_900, 5).await;

        let err = search_products(
            State(state.clone()),
            Query(params(&[("page", "9223372036854775807")])),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "page must be between 1 and 10000");

        let body = search_products(State(state), Query(params(&[("page", "10000")])))
            .await
            .unwrap();
        assert_eq!(body.data.total, 1);
        assert!(body.data.products.is_empty());
    }

    #[tokio::test]
    async fn test_list_hides_inactive() {
        let state = test_state().await;
        create_product(&state, "Silk Saree", 499_900, 5).await;
        let retired = create_product(&state, "Old Saree", 99_900, 5).await;
        state.db.products().soft_delete(&retired.id).await.unwrap();

        let body = list_products(State(state)).await.unwrap();
        assert_eq!(body.data.count, 1);
        assert_eq!(body.data.products[0].name, "Silk Saree");
        assert_eq!(body.data.products[0].price, 4999.0);
    }

    #[tokio::test]
    async fn test_search_pagination_and_price_filter() {
        let state = test_state().await;
        for i in 0..5 {
            create_product(&state, &format!("Saree {i}"), (i + 1) * 10_000, 5).await;
        }

        let body = search_products(
            State(state.clone()),
            Query(params(&[("limit", "2"), ("page", "3"), ("sortBy", "price_asc")])),
        )
        .await
        .unwrap();
        assert_eq!(body.data.total, 5);
        assert_eq!(body.data.total_pages, 3);
        assert_eq!(body.data.current_page, 3);
        assert_eq!(body.data.products.len(), 1);
        assert_eq!(body.data.products[0].price_cents, 50_000);

        let body = search_products(
            State(state.clone()),
            Query(params(&[("minPrice", "200"), ("maxPrice", "300")])),
        )
        .await
        .unwrap();
        assert_eq!(body.data.total, 2);

        let err = search_products(
            State(state),
            Query(params(&[("minPrice", "300"), ("maxPrice", "200")])),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_category_route() {
        let state = test_state().await;
        create_product(&state, "Silk Saree", 10_000, 5).await;

        let body = list_by_category(State(state.clone()), Path("saree".to_string()))
            .await
            .unwrap();
        assert_eq!(body.data.count, 1);

        let body = list_by_category(State(state.clone()), Path("kurta".to_string()))
            .await
            .unwrap();
        assert_eq!(body.data.count, 0);

        let err = list_by_category(State(state), Path("gadgets".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_product_detail_and_reviews() {
        let state = test_state().await;
        let product = create_product(&state, "Silk Saree", 10_000, 5).await;
        let (user, _) = create_account(&state, "asha@example.com", Role::User).await;
        state
            .db
            .reviews()
            .create(&user.id, &product.id, 4, "Lovely weave")
            .await
            .unwrap();

        let body = get_product(State(state.clone()), Path(product.id.clone()))
            .await
            .unwrap();
        assert_eq!(body.data.product.rating, 4.0);
        assert_eq!(body.data.product.review_count, 1);

        let body = list_reviews(State(state.clone()), Path(product.id.clone()))
            .await
            .unwrap();
        assert_eq!(body.data.count, 1);
        assert_eq!(body.data.reviews[0].user_name, "Test Shopper");

        state
            .db
            .products()
            .update(
                &product.id,
                ProductUpdate {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let err = get_product(State(state), Path(product.id)).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }
}
