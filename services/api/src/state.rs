//! Application state shared across handlers

use sqlx::PgPool;

use crate::repositories::{
    UserRepository, catalog::CatalogRepository, orders::OrderRepository,
    reviews::ReviewRepository, shipping::ShippingAddressRepository,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub user_repository: UserRepository,
    pub catalog_repository: CatalogRepository,
    pub order_repository: OrderRepository,
    pub shipping_repository: ShippingAddressRepository,
    pub review_repository: ReviewRepository,
}
