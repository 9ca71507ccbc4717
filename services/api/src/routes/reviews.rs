//! Review handlers

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    error::ApiError,
    middleware::AuthUser,
    models::reviews::{CreateReviewRequest, Review, UpdateReviewRequest},
    state::AppState,
    validation::validate_rating,
};

/// List the reviews of a product
pub async fn get_product_reviews(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state
        .catalog_repository
        .find_product_by_slug(&slug)
        .await
        .map_err(ApiError::internal)?
        .ok_or(ApiError::NotFound("Product not found".to_string()))?;

    let reviews = state
        .review_repository
        .list_for_product(product.id)
        .await
        .map_err(ApiError::internal)?;

    Ok(Json(reviews))
}

/// Submit a review for a product. One review per user and product; a
/// second submission is rejected, never merged.
pub async fn create_review(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(slug): Path<String>,
    Json(payload): Json<CreateReviewRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_rating(payload.rating).map_err(ApiError::Validation)?;

    let product = state
        .catalog_repository
        .find_product_by_slug(&slug)
        .await
        .map_err(ApiError::internal)?
        .ok_or(ApiError::NotFound("Product not found".to_string()))?;

    let review = state
        .review_repository
        .create(user.id, product.id, payload.rating, &payload.text)
        .await
        .map_err(ApiError::internal)?
        .ok_or(ApiError::Validation(
            "You have already reviewed this product".to_string(),
        ))?;

    Ok((StatusCode::CREATED, Json(review)))
}

/// Load a review, enforcing that it belongs to the acting user
async fn owned_review(state: &AppState, user: &AuthUser, id: Uuid) -> Result<Review, ApiError> {
    let review = state
        .review_repository
        .find_by_id(id)
        .await
        .map_err(ApiError::internal)?
        .ok_or(ApiError::NotFound("Review not found".to_string()))?;

    if review.user_id != user.id {
        return Err(ApiError::PermissionDenied);
    }

    Ok(review)
}

/// Fetch one review
pub async fn get_review(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let review = state
        .review_repository
        .find_by_id(id)
        .await
        .map_err(ApiError::internal)?
        .ok_or(ApiError::NotFound("Review not found".to_string()))?;

    Ok(Json(review))
}

/// Update one's own review
pub async fn update_review(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateReviewRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(rating) = payload.rating {
        validate_rating(rating).map_err(ApiError::Validation)?;
    }

    owned_review(&state, &user, id).await?;

    let review = state
        .review_repository
        .update(id, &payload)
        .await
        .map_err(ApiError::internal)?
        .ok_or(ApiError::NotFound("Review not found".to_string()))?;

    Ok(Json(review))
}

/// Withdraw one's own review
pub async fn delete_review(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    owned_review(&state, &user, id).await?;

    state
        .review_repository
        .delete(id)
        .await
        .map_err(ApiError::internal)?;

    Ok(Json(json!({"message": "Review deleted"})))
}
