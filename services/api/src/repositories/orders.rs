//! Cart and order repository
//!
//! A cart is the set of `order_items` rows with no order assigned.
//! Checkout turns that set into an order inside a single transaction:
//! the order insert and the bulk item reassignment either both land or
//! neither does. A checkout that claims no cart rows — empty cart, or a
//! concurrent checkout won the race — rolls its order back, so an empty
//! order can never be committed.

use std::collections::HashMap;

use anyhow::Result;
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::info;
use uuid::Uuid;

use common::codes::{MAX_CODE_ATTEMPTS, generate_code};
use common::error::DatabaseError;

use crate::models::catalog::SellerBrief;
use crate::models::orders::{
    ItemProduct, Order, OrderItem, ShippingDetails,
};

const ITEM_COLUMNS: &str = r#"
    oi.id, oi.order_id, oi.quantity,
    p.name AS product_name, p.slug AS product_slug, p.price_current,
    s.business_name AS seller_name, s.slug AS seller_slug
"#;

const ORDER_COLUMNS: &str = r#"
    id, user_id, tx_ref, delivery_status, payment_status, date_delivered,
    full_name, email, phone, address, city, country, zipcode, created_at
"#;

fn item_from_row(row: &PgRow) -> OrderItem {
    let seller = match (
        row.get::<Option<String>, _>("seller_name"),
        row.get::<Option<String>, _>("seller_slug"),
    ) {
        (Some(name), Some(slug)) => Some(SellerBrief { name, slug }),
        _ => None,
    };
    let quantity: i32 = row.get("quantity");
    let price_current: Decimal = row.get("price_current");

    OrderItem {
        id: row.get("id"),
        product: ItemProduct {
            name: row.get("product_name"),
            slug: row.get("product_slug"),
            price_current,
            seller,
        },
        quantity,
        total: OrderItem::line_total(quantity, price_current),
    }
}

fn order_from_row(row: &PgRow, items: Vec<OrderItem>) -> Result<Order> {
    let delivery_status: String = row.get("delivery_status");
    let payment_status: String = row.get("payment_status");
    let subtotal: Decimal = items.iter().map(|i| i.total).sum();

    Ok(Order {
        id: row.get("id"),
        tx_ref: row.get("tx_ref"),
        delivery_status: delivery_status
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))?,
        payment_status: payment_status
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))?,
        date_delivered: row.get("date_delivered"),
        shipping_details: ShippingDetails {
            full_name: row.get("full_name"),
            email: row.get("email"),
            phone: row.get("phone"),
            address: row.get("address"),
            city: row.get("city"),
            country: row.get("country"),
            zipcode: row.get("zipcode"),
        },
        subtotal,
        // No fees or shipping costs are modelled, so the grand total
        // equals the item subtotal.
        total: subtotal,
        items,
        created_at: row.get("created_at"),
    })
}

/// Result of a cart toggle
pub enum ToggleOutcome {
    /// A new cart row was created
    Created(OrderItem),
    /// An existing cart row's quantity was set
    Updated(OrderItem),
    /// The row was deleted (or was already absent)
    Removed,
}

/// Cart and order repository for database operations
#[derive(Clone)]
pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    /// Create a new order repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The user's cart: all items not yet assigned to an order
    pub async fn cart(&self, user_id: Uuid) -> Result<Vec<OrderItem>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {ITEM_COLUMNS}
            FROM order_items oi
            JOIN products p ON p.id = oi.product_id
            LEFT JOIN sellers s ON s.id = p.seller_id
            WHERE oi.user_id = $1 AND oi.order_id IS NULL
            ORDER BY oi.created_at DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(item_from_row).collect())
    }

    /// Sum of quantity times live current price over the user's cart
    pub async fn cart_total(&self, user_id: Uuid) -> Result<Decimal> {
        let total: Decimal = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(oi.quantity * p.price_current), 0)
            FROM order_items oi
            JOIN products p ON p.id = oi.product_id
            WHERE oi.user_id = $1 AND oi.order_id IS NULL
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    /// Set the quantity of the (user, product) cart row.
    ///
    /// Quantity zero deletes the row. Otherwise this is one conditional
    /// write against the partial unique index, so concurrent toggles
    /// cannot create duplicate cart rows.
    pub async fn toggle_cart_item(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<ToggleOutcome> {
        if quantity == 0 {
            sqlx::query(
                r#"
                DELETE FROM order_items
                WHERE user_id = $1 AND product_id = $2 AND order_id IS NULL
                "#,
            )
            .bind(user_id)
            .bind(product_id)
            .execute(&self.pool)
            .await?;

            return Ok(ToggleOutcome::Removed);
        }

        // xmax = 0 distinguishes a fresh insert from a conflict update.
        let row = sqlx::query(
            r#"
            INSERT INTO order_items (user_id, product_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, product_id) WHERE order_id IS NULL
            DO UPDATE SET quantity = EXCLUDED.quantity, updated_at = now()
            RETURNING id, quantity, (xmax = 0) AS inserted
            "#,
        )
        .bind(user_id)
        .bind(product_id)
        .bind(quantity)
        .fetch_one(&self.pool)
        .await?;

        let item_id: Uuid = row.get("id");
        let inserted: bool = row.get("inserted");

        let item_row = sqlx::query(&format!(
            r#"
            SELECT {ITEM_COLUMNS}
            FROM order_items oi
            JOIN products p ON p.id = oi.product_id
            LEFT JOIN sellers s ON s.id = p.seller_id
            WHERE oi.id = $1
            "#
        ))
        .bind(item_id)
        .fetch_one(&self.pool)
        .await?;

        let item = item_from_row(&item_row);
        Ok(if inserted {
            ToggleOutcome::Created(item)
        } else {
            ToggleOutcome::Updated(item)
        })
    }

    /// Convert the user's cart into an order.
    ///
    /// Returns `None` when there is nothing to claim. The shipping
    /// fields are copied by value; later edits to the address leave the
    /// order untouched.
    pub async fn checkout(
        &self,
        user_id: Uuid,
        shipping: Option<&ShippingDetails>,
    ) -> Result<Option<Order>> {
        let mut tx = self.pool.begin().await?;

        let tx_ref = reserve_tx_ref(&mut tx).await?;

        let empty = ShippingDetails::default();
        let shipping = shipping.unwrap_or(&empty);

        let order_row = sqlx::query(&format!(
            r#"
            INSERT INTO orders (user_id, tx_ref, full_name, email, phone,
                                address, city, country, zipcode)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(&tx_ref)
        .bind(&shipping.full_name)
        .bind(&shipping.email)
        .bind(&shipping.phone)
        .bind(&shipping.address)
        .bind(&shipping.city)
        .bind(&shipping.country)
        .bind(&shipping.zipcode)
        .fetch_one(&mut *tx)
        .await?;

        let order_id: Uuid = order_row.get("id");

        // One bulk reassignment, not a per-row loop. The claimed row
        // count is the cart-emptiness check: under read committed a
        // concurrent checkout can win the race after both transactions
        // saw a full cart, and the loser's update then claims nothing.
        // Zero claimed rows means this order must not survive.
        let claimed = sqlx::query(
            r#"
            UPDATE order_items
            SET order_id = $1, updated_at = now()
            WHERE user_id = $2 AND order_id IS NULL
            "#,
        )
        .bind(order_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        if claimed.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        info!("Created order {tx_ref} for user {user_id}");

        let item_rows = sqlx::query(&format!(
            r#"
            SELECT {ITEM_COLUMNS}
            FROM order_items oi
            JOIN products p ON p.id = oi.product_id
            LEFT JOIN sellers s ON s.id = p.seller_id
            WHERE oi.order_id = $1
            ORDER BY oi.created_at DESC
            "#
        ))
        .bind(order_id)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        let items = item_rows.iter().map(item_from_row).collect();
        Ok(Some(order_from_row(&order_row, items)?))
    }

    /// All orders of a user, newest first, with nested items
    pub async fn list_orders(&self, user_id: Uuid) -> Result<Vec<Order>> {
        let order_rows = sqlx::query(&format!(
            r#"
            SELECT {ORDER_COLUMNS}
            FROM orders
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let item_rows = sqlx::query(&format!(
            r#"
            SELECT {ITEM_COLUMNS}
            FROM order_items oi
            JOIN products p ON p.id = oi.product_id
            LEFT JOIN sellers s ON s.id = p.seller_id
            JOIN orders o ON o.id = oi.order_id
            WHERE o.user_id = $1
            ORDER BY oi.created_at DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut by_order: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
        for row in &item_rows {
            let order_id: Option<Uuid> = row.get("order_id");
            if let Some(order_id) = order_id {
                by_order.entry(order_id).or_default().push(item_from_row(row));
            }
        }

        order_rows
            .iter()
            .map(|row| {
                let id: Uuid = row.get("id");
                order_from_row(row, by_order.remove(&id).unwrap_or_default())
            })
            .collect()
    }

    /// Find an order by transaction reference, returning the owner id
    /// alongside so handlers can avoid leaking other users' orders.
    pub async fn find_order_by_tx_ref(&self, tx_ref: &str) -> Result<Option<(Uuid, Uuid)>> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id
            FROM orders
            WHERE tx_ref = $1
            "#,
        )
        .bind(tx_ref)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| (row.get("user_id"), row.get("id"))))
    }

    /// Items of one order
    pub async fn items_for_order(&self, order_id: Uuid) -> Result<Vec<OrderItem>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {ITEM_COLUMNS}
            FROM order_items oi
            JOIN products p ON p.id = oi.product_id
            LEFT JOIN sellers s ON s.id = p.seller_id
            WHERE oi.order_id = $1
            ORDER BY oi.created_at DESC
            "#
        ))
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(item_from_row).collect())
    }
}

/// Draw transaction-reference candidates until one is free, bounded by
/// [`MAX_CODE_ATTEMPTS`]. The unique constraint on `orders.tx_ref`
/// backstops the check.
async fn reserve_tx_ref(tx: &mut Transaction<'_, Postgres>) -> Result<String> {
    for _ in 0..MAX_CODE_ATTEMPTS {
        let code = generate_code();
        let taken: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM orders WHERE tx_ref = $1)")
                .bind(&code)
                .fetch_one(&mut **tx)
                .await?;
        if !taken {
            return Ok(code);
        }
    }

    Err(DatabaseError::CodeExhausted(MAX_CODE_ATTEMPTS).into())
}
