//! Integration tests for the cart, checkout and review stores
//!
//! These tests run against the PostgreSQL database named by
//! `DATABASE_URL` and are skipped when that variable is unset. Each
//! test seeds its own user and product rows so they can run in any
//! order against a shared database.

use rust_decimal::dec;
use sqlx::PgPool;
use uuid::Uuid;

use api::repositories::orders::{OrderRepository, ToggleOutcome};
use api::repositories::reviews::ReviewRepository;
use common::codes::{CODE_ALPHABET, CODE_LEN};
use common::database::{DatabaseConfig, init_pool};

/// Connect to the test database, applying the schema on first use.
/// Returns `None` when `DATABASE_URL` is not configured.
async fn test_pool() -> Result<Option<PgPool>, Box<dyn std::error::Error>> {
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("DATABASE_URL not set, skipping store integration test");
        return Ok(None);
    }

    let config = DatabaseConfig::from_env()?;
    let pool = init_pool(&config).await?;

    let schema_present: Option<String> =
        sqlx::query_scalar("SELECT to_regclass('order_items')::TEXT")
            .fetch_one(&pool)
            .await?;
    if schema_present.is_none() {
        sqlx::raw_sql(include_str!("../migrations/0001_initial.sql"))
            .execute(&pool)
            .await?;
    }

    Ok(Some(pool))
}

async fn seed_user(pool: &PgPool) -> Result<Uuid, sqlx::Error> {
    sqlx::query_scalar("INSERT INTO users (email) VALUES ($1) RETURNING id")
        .bind(format!("buyer-{}@example.com", Uuid::new_v4()))
        .fetch_one(pool)
        .await
}

async fn seed_product(
    pool: &PgPool,
    price: rust_decimal::Decimal,
) -> Result<Uuid, sqlx::Error> {
    let tag = Uuid::new_v4();
    let category_id: Uuid = sqlx::query_scalar(
        "INSERT INTO categories (name, slug) VALUES ($1, $2) RETURNING id",
    )
    .bind(format!("Category {tag}"))
    .bind(format!("category-{tag}"))
    .fetch_one(pool)
    .await?;

    sqlx::query_scalar(
        r#"
        INSERT INTO products (category_id, name, slug, price_current)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(category_id)
    .bind(format!("Product {tag}"))
    .bind(format!("product-{tag}"))
    .bind(price)
    .fetch_one(pool)
    .await
}

async fn order_count(pool: &PgPool, user_id: Uuid) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await
}

#[tokio::test]
async fn toggling_twice_keeps_one_cart_row() -> Result<(), Box<dyn std::error::Error>> {
    let Some(pool) = test_pool().await? else {
        return Ok(());
    };
    let repo = OrderRepository::new(pool.clone());
    let user_id = seed_user(&pool).await?;
    let product_id = seed_product(&pool, dec!(10.00)).await?;

    let first = repo.toggle_cart_item(user_id, product_id, 3).await?;
    assert!(matches!(first, ToggleOutcome::Created(_)));

    // The toggle sets the quantity, it does not add to it.
    let second = repo.toggle_cart_item(user_id, product_id, 3).await?;
    assert!(matches!(second, ToggleOutcome::Updated(_)));

    let cart = repo.cart(user_id).await?;
    assert_eq!(cart.len(), 1);
    assert_eq!(cart[0].quantity, 3);

    Ok(())
}

#[tokio::test]
async fn toggling_to_zero_removes_the_row() -> Result<(), Box<dyn std::error::Error>> {
    let Some(pool) = test_pool().await? else {
        return Ok(());
    };
    let repo = OrderRepository::new(pool.clone());
    let user_id = seed_user(&pool).await?;
    let product_id = seed_product(&pool, dec!(5.00)).await?;

    repo.toggle_cart_item(user_id, product_id, 2).await?;
    let removed = repo.toggle_cart_item(user_id, product_id, 0).await?;
    assert!(matches!(removed, ToggleOutcome::Removed));
    assert!(repo.cart(user_id).await?.is_empty());

    // Removing an absent row is a quiet no-op.
    let again = repo.toggle_cart_item(user_id, product_id, 0).await?;
    assert!(matches!(again, ToggleOutcome::Removed));

    Ok(())
}

#[tokio::test]
async fn cart_total_follows_the_live_price() -> Result<(), Box<dyn std::error::Error>> {
    let Some(pool) = test_pool().await? else {
        return Ok(());
    };
    let repo = OrderRepository::new(pool.clone());
    let user_id = seed_user(&pool).await?;
    let product_id = seed_product(&pool, dec!(10.00)).await?;

    repo.toggle_cart_item(user_id, product_id, 2).await?;
    assert_eq!(repo.cart_total(user_id).await?, dec!(20.00));

    sqlx::query("UPDATE products SET price_current = $1 WHERE id = $2")
        .bind(dec!(12.50))
        .bind(product_id)
        .execute(&pool)
        .await?;

    assert_eq!(repo.cart_total(user_id).await?, dec!(25.00));

    Ok(())
}

#[tokio::test]
async fn empty_cart_checkout_creates_no_order() -> Result<(), Box<dyn std::error::Error>> {
    let Some(pool) = test_pool().await? else {
        return Ok(());
    };
    let repo = OrderRepository::new(pool.clone());
    let user_id = seed_user(&pool).await?;

    assert!(repo.checkout(user_id, None).await?.is_none());
    assert_eq!(order_count(&pool, user_id).await?, 0);

    Ok(())
}

#[tokio::test]
async fn checkout_claims_the_cart_exactly_once() -> Result<(), Box<dyn std::error::Error>> {
    let Some(pool) = test_pool().await? else {
        return Ok(());
    };
    let repo = OrderRepository::new(pool.clone());
    let user_id = seed_user(&pool).await?;
    let product_id = seed_product(&pool, dec!(19.99)).await?;

    repo.toggle_cart_item(user_id, product_id, 2).await?;

    let order = repo
        .checkout(user_id, None)
        .await?
        .expect("a full cart must check out");
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.items[0].quantity, 2);
    assert_eq!(order.subtotal, dec!(39.98));
    assert_eq!(order.tx_ref.len(), CODE_LEN);
    assert!(order.tx_ref.bytes().all(|b| CODE_ALPHABET.contains(&b)));

    // The items moved into the order, so the cart is now empty and a
    // second checkout has nothing left to claim.
    assert!(repo.cart(user_id).await?.is_empty());
    assert!(repo.checkout(user_id, None).await?.is_none());
    assert_eq!(order_count(&pool, user_id).await?, 1);

    Ok(())
}

#[tokio::test]
async fn concurrent_checkouts_commit_exactly_one_order()
-> Result<(), Box<dyn std::error::Error>> {
    let Some(pool) = test_pool().await? else {
        return Ok(());
    };
    let repo = OrderRepository::new(pool.clone());
    let user_id = seed_user(&pool).await?;
    let product_id = seed_product(&pool, dec!(7.00)).await?;

    repo.toggle_cart_item(user_id, product_id, 1).await?;

    // Both checkouts see the full cart before either commits. Only the
    // one whose bulk update claims the rows may produce an order.
    let (a, b) = tokio::join!(repo.checkout(user_id, None), repo.checkout(user_id, None));
    let orders = [a?, b?];
    assert_eq!(orders.iter().filter(|o| o.is_some()).count(), 1);
    assert_eq!(order_count(&pool, user_id).await?, 1);

    let empty_orders: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM orders o
        WHERE o.user_id = $1
          AND NOT EXISTS (SELECT 1 FROM order_items oi WHERE oi.order_id = o.id)
        "#,
    )
    .bind(user_id)
    .fetch_one(&pool)
    .await?;
    assert_eq!(empty_orders, 0, "the losing checkout must leave no order behind");

    Ok(())
}

#[tokio::test]
async fn transaction_references_do_not_repeat() -> Result<(), Box<dyn std::error::Error>> {
    let Some(pool) = test_pool().await? else {
        return Ok(());
    };
    let repo = OrderRepository::new(pool.clone());
    let product_id = seed_product(&pool, dec!(3.00)).await?;

    let mut refs = Vec::new();
    for _ in 0..2 {
        let user_id = seed_user(&pool).await?;
        repo.toggle_cart_item(user_id, product_id, 1).await?;
        let order = repo
            .checkout(user_id, None)
            .await?
            .expect("a full cart must check out");
        refs.push(order.tx_ref);
    }

    assert_ne!(refs[0], refs[1]);

    Ok(())
}

#[tokio::test]
async fn one_review_per_user_and_product() -> Result<(), Box<dyn std::error::Error>> {
    let Some(pool) = test_pool().await? else {
        return Ok(());
    };
    let repo = ReviewRepository::new(pool.clone());
    let author = seed_user(&pool).await?;
    let other = seed_user(&pool).await?;
    let product_id = seed_product(&pool, dec!(4.00)).await?;

    let review = repo.create(author, product_id, 5, "Great").await?;
    assert!(review.is_some());

    // A second review by the same author is refused and the original
    // one is kept as written.
    let duplicate = repo.create(author, product_id, 1, "Changed my mind").await?;
    assert!(duplicate.is_none());
    let kept = repo.find_by_id(review.unwrap().id).await?.unwrap();
    assert_eq!(kept.rating, 5);

    let second_author = repo.create(other, product_id, 4, "Good").await?;
    assert!(second_author.is_some());

    Ok(())
}
