//! Category and product payloads

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Category entity
#[derive(Debug, Clone, Serialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request for category creation
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
}

/// Category reference embedded in product payloads
#[derive(Debug, Clone, Serialize)]
pub struct CategoryBrief {
    pub name: String,
    pub slug: String,
}

/// Seller reference embedded in product payloads
#[derive(Debug, Clone, Serialize)]
pub struct SellerBrief {
    pub name: String,
    pub slug: String,
}

/// Product entity as served by the catalog endpoints
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub desc: String,
    pub price_old: Option<Decimal>,
    pub price_current: Decimal,
    pub in_stock: i32,
    pub category: CategoryBrief,
    pub seller: Option<SellerBrief>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Product detail, including the aggregated review rating
#[derive(Debug, Clone, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub average_rating: f64,
}

/// Query parameters for the product listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductQuery {
    pub max_price: Option<Decimal>,
    pub min_price: Option<Decimal>,
    /// When true, only products with stock remaining
    pub in_stock: Option<bool>,
    /// Only products created at or after this instant
    pub created_from: Option<DateTime<Utc>>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

/// Paginated product listing
#[derive(Debug, Clone, Serialize)]
pub struct ProductListResponse {
    pub items: Vec<Product>,
    pub page: u32,
    pub page_size: u32,
    pub total: i64,
}
