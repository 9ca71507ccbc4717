//! Marketplace API service: catalog, cart, checkout, orders, reviews,
//! shipping addresses and user profiles over PostgreSQL.

pub mod error;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod state;
pub mod validation;
