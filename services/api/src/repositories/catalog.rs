//! Catalog repository: categories, products and seller lookups

use anyhow::Result;
use sqlx::{PgPool, Row};
use sqlx::postgres::PgRow;
use tracing::info;
use uuid::Uuid;

use common::text::slugify;

use crate::models::catalog::{
    Category, CategoryBrief, Product, ProductListResponse, ProductQuery, SellerBrief,
};

/// How many suffixed slug candidates to try before giving up
const MAX_SLUG_ATTEMPTS: u32 = 10;

/// Effective (page, page_size, offset) after defaults and clamping
fn page_window(page: Option<u32>, page_size: Option<u32>) -> (u32, u32, i64) {
    let page = page.unwrap_or(1).max(1);
    let page_size = page_size.unwrap_or(10).clamp(1, 100);
    let offset = (page - 1) as i64 * page_size as i64;
    (page, page_size, offset)
}

const PRODUCT_COLUMNS: &str = r#"
    p.id, p.name, p.slug, p."desc", p.price_old, p.price_current, p.in_stock,
    p.created_at, p.updated_at,
    c.name AS category_name, c.slug AS category_slug,
    s.business_name AS seller_name, s.slug AS seller_slug
"#;

fn category_from_row(row: &PgRow) -> Category {
    Category {
        id: row.get("id"),
        name: row.get("name"),
        slug: row.get("slug"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn product_from_row(row: &PgRow) -> Product {
    let seller = match (
        row.get::<Option<String>, _>("seller_name"),
        row.get::<Option<String>, _>("seller_slug"),
    ) {
        (Some(name), Some(slug)) => Some(SellerBrief { name, slug }),
        _ => None,
    };

    Product {
        id: row.get("id"),
        name: row.get("name"),
        slug: row.get("slug"),
        desc: row.get("desc"),
        price_old: row.get("price_old"),
        price_current: row.get("price_current"),
        in_stock: row.get("in_stock"),
        category: CategoryBrief {
            name: row.get("category_name"),
            slug: row.get("category_slug"),
        },
        seller,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Catalog repository for database operations
#[derive(Clone)]
pub struct CatalogRepository {
    pool: PgPool,
}

impl CatalogRepository {
    /// Create a new catalog repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List all categories
    pub async fn list_categories(&self) -> Result<Vec<Category>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, slug, created_at, updated_at
            FROM categories
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(category_from_row).collect())
    }

    /// Create a category with a slug derived from its name.
    ///
    /// Returns `None` when the name is already taken. Slug collisions with
    /// differently-named categories are resolved by suffixing.
    pub async fn create_category(&self, name: &str) -> Result<Option<Category>> {
        info!("Creating category {name}");

        let base = slugify(name);
        for attempt in 0..MAX_SLUG_ATTEMPTS {
            let slug = if attempt == 0 {
                base.clone()
            } else {
                format!("{base}-{}", attempt + 1)
            };

            let result = sqlx::query(
                r#"
                INSERT INTO categories (name, slug)
                VALUES ($1, $2)
                RETURNING id, name, slug, created_at, updated_at
                "#,
            )
            .bind(name)
            .bind(&slug)
            .fetch_one(&self.pool)
            .await;

            match result {
                Ok(row) => return Ok(Some(category_from_row(&row))),
                Err(sqlx::Error::Database(db))
                    if db.constraint() == Some("categories_name_key") =>
                {
                    return Ok(None);
                }
                Err(sqlx::Error::Database(db))
                    if db.constraint() == Some("categories_slug_key") =>
                {
                    continue;
                }
                Err(e) => return Err(e.into()),
            }
        }

        anyhow::bail!("could not find a free slug for category {name}")
    }

    /// Find a category by slug
    pub async fn find_category_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, slug, created_at, updated_at
            FROM categories
            WHERE slug = $1
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(category_from_row))
    }

    /// List products with filters and pagination. The response carries
    /// the effective page and page size after clamping.
    pub async fn list_products(&self, query: &ProductQuery) -> Result<ProductListResponse> {
        let (page, page_size, offset) = page_window(query.page, query.page_size);

        // Conditions and binds are pushed in lockstep so the placeholder
        // numbers stay in sync.
        let mut conditions = vec!["p.is_deleted = FALSE".to_string()];
        let mut next_param = 1;

        if query.max_price.is_some() {
            conditions.push(format!("p.price_current <= ${next_param}"));
            next_param += 1;
        }
        if query.min_price.is_some() {
            conditions.push(format!("p.price_current >= ${next_param}"));
            next_param += 1;
        }
        if query.in_stock == Some(true) {
            conditions.push("p.in_stock > 0".to_string());
        }
        if query.created_from.is_some() {
            conditions.push(format!("p.created_at >= ${next_param}"));
            next_param += 1;
        }

        let where_clause = conditions.join(" AND ");
        let limit_param = next_param;
        let offset_param = next_param + 1;
        let list_sql = format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products p
            JOIN categories c ON c.id = p.category_id
            LEFT JOIN sellers s ON s.id = p.seller_id
            WHERE {where_clause}
            ORDER BY p.created_at DESC
            LIMIT ${limit_param} OFFSET ${offset_param}
            "#
        );
        let count_sql = format!("SELECT COUNT(*) FROM products p WHERE {where_clause}");

        let mut list_query = sqlx::query(&list_sql);
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        if let Some(max_price) = query.max_price {
            list_query = list_query.bind(max_price);
            count_query = count_query.bind(max_price);
        }
        if let Some(min_price) = query.min_price {
            list_query = list_query.bind(min_price);
            count_query = count_query.bind(min_price);
        }
        if let Some(created_from) = query.created_from {
            list_query = list_query.bind(created_from);
            count_query = count_query.bind(created_from);
        }
        list_query = list_query.bind(page_size as i64).bind(offset);

        let rows = list_query.fetch_all(&self.pool).await?;
        let total = count_query.fetch_one(&self.pool).await?;

        Ok(ProductListResponse {
            items: rows.iter().map(product_from_row).collect(),
            page,
            page_size,
            total,
        })
    }

    /// Find a product by slug
    pub async fn find_product_by_slug(&self, slug: &str) -> Result<Option<Product>> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products p
            JOIN categories c ON c.id = p.category_id
            LEFT JOIN sellers s ON s.id = p.seller_id
            WHERE p.slug = $1 AND p.is_deleted = FALSE
            "#
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(product_from_row))
    }

    /// Average review rating for a product, 0 when unreviewed
    pub async fn average_rating(&self, product_id: Uuid) -> Result<f64> {
        let avg: f64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(AVG(rating)::FLOAT8, 0)
            FROM reviews
            WHERE product_id = $1
            "#,
        )
        .bind(product_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(avg)
    }

    /// List the products of one category
    pub async fn list_products_by_category(&self, category_id: Uuid) -> Result<Vec<Product>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products p
            JOIN categories c ON c.id = p.category_id
            LEFT JOIN sellers s ON s.id = p.seller_id
            WHERE p.category_id = $1 AND p.is_deleted = FALSE
            ORDER BY p.created_at DESC
            "#
        ))
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(product_from_row).collect())
    }

    /// Resolve a seller's id by slug
    pub async fn find_seller_id_by_slug(&self, slug: &str) -> Result<Option<Uuid>> {
        let id = sqlx::query_scalar(
            r#"
            SELECT id
            FROM sellers
            WHERE slug = $1
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(id)
    }

    /// List the products of one seller
    pub async fn list_products_by_seller(&self, seller_id: Uuid) -> Result<Vec<Product>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products p
            JOIN categories c ON c.id = p.category_id
            LEFT JOIN sellers s ON s.id = p.seller_id
            WHERE p.seller_id = $1 AND p.is_deleted = FALSE
            ORDER BY p.created_at DESC
            "#
        ))
        .bind(seller_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(product_from_row).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_window_applies_defaults_and_clamps() {
        assert_eq!(page_window(None, None), (1, 10, 0));
        assert_eq!(page_window(Some(0), Some(0)), (1, 1, 0));
        assert_eq!(page_window(Some(3), Some(500)), (3, 100, 200));
        assert_eq!(page_window(Some(2), Some(25)), (2, 25, 25));
    }
}
