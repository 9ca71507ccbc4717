//! Shipping address repository

use anyhow::Result;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

use crate::models::orders::{ShippingAddress, ShippingAddressRequest};

fn address_from_row(row: &PgRow) -> ShippingAddress {
    ShippingAddress {
        id: row.get("id"),
        full_name: row.get("full_name"),
        email: row.get("email"),
        phone: row.get("phone"),
        address: row.get("address"),
        city: row.get("city"),
        country: row.get("country"),
        zipcode: row.get("zipcode"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

const ADDRESS_COLUMNS: &str = r#"
    id, user_id, full_name, email, phone, address, city, country, zipcode,
    created_at, updated_at
"#;

/// Shipping address repository for database operations
#[derive(Clone)]
pub struct ShippingAddressRepository {
    pool: PgPool,
}

impl ShippingAddressRepository {
    /// Create a new shipping address repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List a user's shipping addresses
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<ShippingAddress>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {ADDRESS_COLUMNS}
            FROM shipping_addresses
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(address_from_row).collect())
    }

    /// Return the user's existing address with these exact fields, or
    /// insert a new one. Submitting the same address twice does not
    /// duplicate it.
    pub async fn get_or_create(
        &self,
        user_id: Uuid,
        payload: &ShippingAddressRequest,
    ) -> Result<ShippingAddress> {
        let existing = sqlx::query(&format!(
            r#"
            SELECT {ADDRESS_COLUMNS}
            FROM shipping_addresses
            WHERE user_id = $1
              AND full_name = $2
              AND email = $3
              AND phone IS NOT DISTINCT FROM $4
              AND address IS NOT DISTINCT FROM $5
              AND city IS NOT DISTINCT FROM $6
              AND country IS NOT DISTINCT FROM $7
              AND zipcode IS NOT DISTINCT FROM $8
            "#
        ))
        .bind(user_id)
        .bind(&payload.full_name)
        .bind(&payload.email)
        .bind(&payload.phone)
        .bind(&payload.address)
        .bind(&payload.city)
        .bind(&payload.country)
        .bind(&payload.zipcode)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = existing {
            return Ok(address_from_row(&row));
        }

        info!("Creating shipping address for user {user_id}");

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO shipping_addresses
                (user_id, full_name, email, phone, address, city, country, zipcode)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {ADDRESS_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(&payload.full_name)
        .bind(&payload.email)
        .bind(&payload.phone)
        .bind(&payload.address)
        .bind(&payload.city)
        .bind(&payload.country)
        .bind(&payload.zipcode)
        .fetch_one(&self.pool)
        .await?;

        Ok(address_from_row(&row))
    }

    /// Find an address by id, returning the owner alongside for
    /// permission checks.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<(Uuid, ShippingAddress)>> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {ADDRESS_COLUMNS}
            FROM shipping_addresses
            WHERE id = $1
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| (row.get("user_id"), address_from_row(&row))))
    }

    /// Replace an address's fields
    pub async fn update(
        &self,
        id: Uuid,
        payload: &ShippingAddressRequest,
    ) -> Result<Option<ShippingAddress>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE shipping_addresses
            SET full_name = $2, email = $3, phone = $4, address = $5,
                city = $6, country = $7, zipcode = $8, updated_at = now()
            WHERE id = $1
            RETURNING {ADDRESS_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&payload.full_name)
        .bind(&payload.email)
        .bind(&payload.phone)
        .bind(&payload.address)
        .bind(&payload.city)
        .bind(&payload.country)
        .bind(&payload.zipcode)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(address_from_row))
    }

    /// Delete an address
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM shipping_addresses WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
