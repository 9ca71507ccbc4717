//! Profile, shipping address and order handlers

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
    models::UpdateProfileRequest,
    models::orders::{ShippingAddress, ShippingAddressRequest},
    state::AppState,
    validation::validate_email,
};

/// Fetch the current user's profile
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = state
        .user_repository
        .find_by_id(user.id)
        .await
        .map_err(ApiError::internal)?
        .ok_or(ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(profile))
}

/// Update the current user's profile
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = state
        .user_repository
        .update_profile(user.id, &payload)
        .await
        .map_err(ApiError::internal)?
        .ok_or(ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(profile))
}

/// Deactivate the current user's account
pub async fn deactivate_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiError> {
    let deactivated = state
        .user_repository
        .deactivate(user.id)
        .await
        .map_err(ApiError::internal)?;

    if !deactivated {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    Ok(Json(json!({"message": "Account deactivated"})))
}

/// List the current user's shipping addresses
pub async fn get_addresses(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiError> {
    let addresses = state
        .shipping_repository
        .list_for_user(user.id)
        .await
        .map_err(ApiError::internal)?;

    Ok(Json(addresses))
}

/// Create a shipping address (or return the identical existing one)
pub async fn create_address(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<ShippingAddressRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_email(&payload.email).map_err(ApiError::Validation)?;
    if payload.full_name.trim().is_empty() {
        return Err(ApiError::Validation("Full name is required".to_string()));
    }

    let address = state
        .shipping_repository
        .get_or_create(user.id, &payload)
        .await
        .map_err(ApiError::internal)?;

    Ok((StatusCode::CREATED, Json(address)))
}

/// Load an address by id, enforcing ownership
async fn owned_address(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> Result<ShippingAddress, ApiError> {
    let (owner, address) = state
        .shipping_repository
        .find_by_id(id)
        .await
        .map_err(ApiError::internal)?
        .ok_or(ApiError::NotFound("Shipping address not found".to_string()))?;

    if owner != user.id {
        return Err(ApiError::PermissionDenied);
    }

    Ok(address)
}

/// Fetch one shipping address
pub async fn get_address(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let address = owned_address(&state, &user, id).await?;
    Ok(Json(address))
}

/// Update one shipping address
pub async fn update_address(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ShippingAddressRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_email(&payload.email).map_err(ApiError::Validation)?;
    owned_address(&state, &user, id).await?;

    let address = state
        .shipping_repository
        .update(id, &payload)
        .await
        .map_err(ApiError::internal)?
        .ok_or(ApiError::NotFound("Shipping address not found".to_string()))?;

    Ok(Json(address))
}

/// Delete one shipping address
pub async fn delete_address(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    owned_address(&state, &user, id).await?;

    state
        .shipping_repository
        .delete(id)
        .await
        .map_err(ApiError::internal)?;

    Ok(Json(json!({"message": "Shipping address deleted"})))
}

/// List the current user's orders, newest first
pub async fn get_orders(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiError> {
    let orders = state
        .order_repository
        .list_orders(user.id)
        .await
        .map_err(ApiError::internal)?;

    Ok(Json(orders))
}

/// Items of one order, addressed by transaction reference.
///
/// Another user's order answers 404, not 403: the reference should not
/// reveal whether it exists.
pub async fn get_order_items(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(tx_ref): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let order = state
        .order_repository
        .find_order_by_tx_ref(&tx_ref)
        .await
        .map_err(ApiError::internal)?;

    let order_id = match order {
        Some((owner, order_id)) if owner == user.id => order_id,
        _ => return Err(ApiError::NotFound("Order does not exist".to_string())),
    };

    let items = state
        .order_repository
        .items_for_order(order_id)
        .await
        .map_err(ApiError::internal)?;

    Ok(Json(items))
}
