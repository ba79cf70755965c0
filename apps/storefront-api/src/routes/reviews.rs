//! Review submission.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use storefront_core::validation::{validate_comment, validate_rating};
use tracing::info;

use crate::auth::AuthUser;
use crate::dto::ReviewDto;
use crate::error::{ApiError, ApiResult};
use crate::response::Envelope;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateReviewRequest {
    pub product_id: String,
    pub rating: i64,
    pub comment: String,
}

#[derive(Debug, Serialize)]
pub struct ReviewBody {
    pub review: ReviewDto,
}

/// One review per customer per product; the product's rating aggregate is
/// updated in the same transaction.
pub async fn create_review(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    payload: Result<Json<CreateReviewRequest>, JsonRejection>,
) -> ApiResult<Envelope<ReviewBody>> {
    let Json(req) = payload?;

    if req.product_id.trim().is_empty() {
        return Err(ApiError::validation("productId is required"));
    }
    validate_rating(req.rating)?;
    let comment = validate_comment(&req.comment)?;

    let review = state
        .db
        .reviews()
        .create(&auth.user_id, req.product_id.trim(), req.rating, &comment)
        .await?;

    let author = state
        .db
        .users()
        .get_by_id(&auth.user_id)
        .await?
        .map(|u| u.name)
        .unwrap_or_default();

    info!(review_id = %review.id, product_id = %review.product_id, "Review added");

    Ok(Envelope::created(
        "Review added successfully",
        ReviewBody {
            review: ReviewDto::from(storefront_db::ReviewWithAuthor {
                review,
                user_name: author,
            }),
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::test_support::{auth_user, create_account, create_product, test_state};
    use axum::http::StatusCode;
    use storefront_core::Role;

    fn request(product_id: &str, rating: i64) -> CreateReviewRequest {
        CreateReviewRequest {
            product_id: product_id.to_string(),
            rating,
            comment: "Beautiful drape".to_string(),
        }
    }

    #[tokio::test]
    async fn test_review_updates_rating() {
        let state = test_state().await;
        let (asha, _) = create_account(&state, "asha@example.com", Role::User).await;
        let (ravi, _) = create_account(&state, "ravi@example.com", Role::User).await;
        let saree = create_product(&state, "Silk Saree", 10_000, 5).await;

        let body = create_review(State(state.clone()), auth_user(&asha), Ok(Json(request(&saree.id, 5))))
            .await
            .unwrap();
        assert_eq!(body.status, StatusCode::CREATED);
        assert_eq!(body.data.review.user_name, "Test Shopper");

        create_review(State(state.clone()), auth_user(&ravi), Ok(Json(request(&saree.id, 2))))
            .await
            .unwrap();

        let saree = state.db.products().get_by_id(&saree.id).await.unwrap().unwrap();
        assert_eq!(saree.review_count, 2);
        assert_eq!(saree.rating(), 3.5);
    }

    #[tokio::test]
    async fn test_duplicate_review_conflicts() {
        let state = test_state().await;
        let (asha, _) = create_account(&state, "asha@example.com", Role::User).await;
        let saree = create_product(&state, "Silk Saree", 10_000, 5).await;

        create_review(State(state.clone()), auth_user(&asha), Ok(Json(request(&saree.id, 5))))
            .await
            .unwrap();
        let err = create_review(State(state), auth_user(&asha), Ok(Json(request(&saree.id, 1))))
            .await
            .unwrap_err();

        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.message, "You have already reviewed this product");
    }

    #[tokio::test]
    async fn test_review_validation() {
        let state = test_state().await;
        let (asha, _) = create_account(&state, "asha@example.com", Role::User).await;
        let saree = create_product(&state, "Silk Saree", 10_000, 5).await;

        let err = create_review(State(state.clone()), auth_user(&asha), Ok(Json(request(&saree.id, 6))))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let mut blank = request(&saree.id, 4);
        blank.comment = "  ".to_string();
        let err = create_review(State(state.clone()), auth_user(&asha), Ok(Json(blank)))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = create_review(State(state), auth_user(&asha), Ok(Json(request("missing", 4))))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }
}
