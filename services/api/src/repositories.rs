//! Repositories for database operations

use anyhow::Result;
use sqlx::{PgPool, Row};
use sqlx::postgres::PgRow;
use tracing::info;
use uuid::Uuid;

use crate::models::{Profile, UpdateProfileRequest};

pub mod catalog;
pub mod orders;
pub mod reviews;
pub mod shipping;

fn profile_from_row(row: &PgRow) -> Result<Profile> {
    let account_type: String = row.get("account_type");
    Ok(Profile {
        id: row.get("id"),
        email: row.get("email"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        account_type: account_type
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))?,
        is_active: row.get("is_active"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

/// User repository for database operations
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a user by ID. Soft-deleted users are invisible here.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Profile>> {
        let row = sqlx::query(
            r#"
            SELECT id, email, first_name, last_name, account_type, is_active,
                   created_at, updated_at
            FROM users
            WHERE id = $1 AND is_deleted = FALSE
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(profile_from_row).transpose()
    }

    /// Apply a typed partial update to the user's mutable fields.
    pub async fn update_profile(
        &self,
        id: Uuid,
        update: &UpdateProfileRequest,
    ) -> Result<Option<Profile>> {
        info!("Updating profile for user {id}");

        let row = sqlx::query(
            r#"
            UPDATE users
            SET first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                account_type = COALESCE($4, account_type),
                updated_at = now()
            WHERE id = $1 AND is_deleted = FALSE
            RETURNING id, email, first_name, last_name, account_type, is_active,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&update.first_name)
        .bind(&update.last_name)
        .bind(update.account_type.map(|t| t.as_str()))
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(profile_from_row).transpose()
    }

    /// Deactivate the account. The row stays in place; default queries
    /// keep serving it as an inactive user.
    pub async fn deactivate(&self, id: Uuid) -> Result<bool> {
        info!("Deactivating user {id}");

        let result = sqlx::query(
            r#"
            UPDATE users
            SET is_active = FALSE, updated_at = now()
            WHERE id = $1 AND is_deleted = FALSE
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
