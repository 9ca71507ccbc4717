//! API service routes

use axum::{
    Json, Router,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;

use crate::{middleware::auth_middleware, state::AppState};

pub mod profiles;
pub mod reviews;
pub mod shop;

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route(
            "/api/profile",
            get(profiles::get_profile)
                .put(profiles::update_profile)
                .delete(profiles::deactivate_profile),
        )
        .route(
            "/api/profile/addresses",
            get(profiles::get_addresses).post(profiles::create_address),
        )
        .route(
            "/api/profile/addresses/:id",
            get(profiles::get_address)
                .put(profiles::update_address)
                .delete(profiles::delete_address),
        )
        .route("/api/profile/orders", get(profiles::get_orders))
        .route(
            "/api/profile/orders/:tx_ref/items",
            get(profiles::get_order_items),
        )
        .route("/api/shop/cart", get(shop::get_cart).post(shop::toggle_cart_item))
        .route("/api/shop/checkout", post(shop::checkout))
        .route(
            "/api/shop/products/:slug/reviews",
            get(reviews::get_product_reviews).post(reviews::create_review),
        )
        .route(
            "/api/reviews/:id",
            get(reviews::get_review)
                .put(reviews::update_review)
                .delete(reviews::delete_review),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route(
            "/api/shop/categories",
            get(shop::get_categories).post(shop::create_category),
        )
        .route(
            "/api/shop/categories/:slug/products",
            get(shop::get_products_by_category),
        )
        .route("/api/shop/products", get(shop::get_products))
        .route("/api/shop/products/:slug", get(shop::get_product))
        .route(
            "/api/shop/sellers/:slug/products",
            get(shop::get_products_by_seller),
        )
        .merge(protected_routes)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "marketplace-api"
    }))
}
