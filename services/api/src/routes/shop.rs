//! Catalog, cart and checkout handlers

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use crate::{
    error::ApiError,
    middleware::AuthUser,
    models::catalog::{CreateCategoryRequest, ProductDetail, ProductQuery},
    models::orders::{
        CheckoutRequest, ToggleCartItemRequest, ToggleCartItemResponse,
    },
    repositories::orders::ToggleOutcome,
    state::AppState,
    validation::{validate_name, validate_quantity},
};

/// List all categories
pub async fn get_categories(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let categories = state
        .catalog_repository
        .list_categories()
        .await
        .map_err(ApiError::internal)?;

    Ok(Json(categories))
}

/// Create a category
pub async fn create_category(
    State(state): State<AppState>,
    Json(payload): Json<CreateCategoryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_name(&payload.name).map_err(ApiError::Validation)?;

    let category = state
        .catalog_repository
        .create_category(payload.name.trim())
        .await
        .map_err(ApiError::internal)?
        .ok_or(ApiError::Validation("Category already exists".to_string()))?;

    Ok((StatusCode::CREATED, Json(category)))
}

/// List the products of a category
pub async fn get_products_by_category(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let category = state
        .catalog_repository
        .find_category_by_slug(&slug)
        .await
        .map_err(ApiError::internal)?
        .ok_or(ApiError::NotFound("Category does not exist".to_string()))?;

    let products = state
        .catalog_repository
        .list_products_by_category(category.id)
        .await
        .map_err(ApiError::internal)?;

    Ok(Json(products))
}

/// List products with filters and pagination
pub async fn get_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let listing = state
        .catalog_repository
        .list_products(&query)
        .await
        .map_err(ApiError::internal)?;

    Ok(Json(listing))
}

/// Product detail by slug, with the aggregated review rating
pub async fn get_product(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state
        .catalog_repository
        .find_product_by_slug(&slug)
        .await
        .map_err(ApiError::internal)?
        .ok_or(ApiError::NotFound("Product not found".to_string()))?;

    let average_rating = state
        .catalog_repository
        .average_rating(product.id)
        .await
        .map_err(ApiError::internal)?;

    Ok(Json(ProductDetail {
        product,
        average_rating,
    }))
}

/// List the products of a seller
pub async fn get_products_by_seller(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let seller_id = state
        .catalog_repository
        .find_seller_id_by_slug(&slug)
        .await
        .map_err(ApiError::internal)?
        .ok_or(ApiError::NotFound("Seller does not exist".to_string()))?;

    let products = state
        .catalog_repository
        .list_products_by_seller(seller_id)
        .await
        .map_err(ApiError::internal)?;

    Ok(Json(products))
}

/// The current user's cart with its running total
pub async fn get_cart(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiError> {
    let items = state
        .order_repository
        .cart(user.id)
        .await
        .map_err(ApiError::internal)?;

    let total = state
        .order_repository
        .cart_total(user.id)
        .await
        .map_err(ApiError::internal)?;

    Ok(Json(json!({
        "items": items,
        "total": total,
    })))
}

/// Set a cart row's quantity by product slug; zero removes the row
pub async fn toggle_cart_item(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<ToggleCartItemRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state
        .catalog_repository
        .find_product_by_slug(&payload.slug)
        .await
        .map_err(ApiError::internal)?
        .ok_or(ApiError::NotFound(
            "No product with this slug".to_string(),
        ))?;

    let quantity = validate_quantity(payload.quantity).map_err(ApiError::Validation)?;

    let outcome = state
        .order_repository
        .toggle_cart_item(user.id, product.id, quantity)
        .await
        .map_err(ApiError::internal)?;

    let (status, response) = match outcome {
        ToggleOutcome::Created(item) => (
            StatusCode::CREATED,
            ToggleCartItemResponse {
                message: "Item added to cart".to_string(),
                item: Some(item),
            },
        ),
        ToggleOutcome::Updated(item) => (
            StatusCode::OK,
            ToggleCartItemResponse {
                message: "Item updated in cart".to_string(),
                item: Some(item),
            },
        ),
        ToggleOutcome::Removed => (
            StatusCode::OK,
            ToggleCartItemResponse {
                message: "Item removed from cart".to_string(),
                item: None,
            },
        ),
    };

    Ok((status, Json(response)))
}

/// Convert the cart into an order
pub async fn checkout(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Option<Json<CheckoutRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();

    let shipping = match payload.shipping_id {
        Some(shipping_id) => {
            let found = state
                .shipping_repository
                .find_by_id(shipping_id)
                .await
                .map_err(ApiError::internal)?;

            // An unknown id and someone else's address look the same
            // from here.
            match found {
                Some((owner, address)) if owner == user.id => Some(address.into_details()),
                _ => {
                    return Err(ApiError::NotFound(
                        "No shipping address with this ID".to_string(),
                    ));
                }
            }
        }
        None => None,
    };

    let order = state
        .order_repository
        .checkout(user.id, shipping.as_ref())
        .await
        .map_err(ApiError::internal)?
        .ok_or(ApiError::NotFound("No items in cart".to_string()))?;

    Ok(Json(json!({
        "message": "Order placed successfully",
        "item": order,
    })))
}
