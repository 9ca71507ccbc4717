//! Review repository

use anyhow::Result;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

use crate::models::reviews::{Review, UpdateReviewRequest};

const REVIEW_COLUMNS: &str =
    "id, user_id, product_id, rating, text, created_at, updated_at";

fn review_from_row(row: &PgRow) -> Review {
    Review {
        id: row.get("id"),
        user_id: row.get("user_id"),
        product_id: row.get("product_id"),
        rating: row.get("rating"),
        text: row.get("text"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Review repository for database operations
#[derive(Clone)]
pub struct ReviewRepository {
    pool: PgPool,
}

impl ReviewRepository {
    /// Create a new review repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List the reviews of one product
    pub async fn list_for_product(&self, product_id: Uuid) -> Result<Vec<Review>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {REVIEW_COLUMNS}
            FROM reviews
            WHERE product_id = $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(review_from_row).collect())
    }

    /// Create a review. Returns `None` when this user already reviewed
    /// the product; the existing review is never overwritten.
    pub async fn create(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        rating: i32,
        text: &str,
    ) -> Result<Option<Review>> {
        info!("Creating review by user {user_id} for product {product_id}");

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO reviews (user_id, product_id, rating, text)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, product_id) DO NOTHING
            RETURNING {REVIEW_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(product_id)
        .bind(rating)
        .bind(text)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(review_from_row))
    }

    /// Find a review by id
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Review>> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {REVIEW_COLUMNS}
            FROM reviews
            WHERE id = $1
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(review_from_row))
    }

    /// Apply a typed partial update to a review
    pub async fn update(
        &self,
        id: Uuid,
        update: &UpdateReviewRequest,
    ) -> Result<Option<Review>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE reviews
            SET rating = COALESCE($2, rating),
                text = COALESCE($3, text),
                updated_at = now()
            WHERE id = $1
            RETURNING {REVIEW_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(update.rating)
        .bind(&update.text)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(review_from_row))
    }

    /// Withdraw a review. Physical removal, so the author may review the
    /// product again later.
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
