//! Order placement tests against a live Postgres instance.
//!
//! These need `DATABASE_URL` pointing at a database with schema.sql applied,
//! so they are `#[ignore]`d by default:
//!
//!   cargo test -- --ignored

use sqlx::PgPool;
use storefront_api::errors::AppError;
use storefront_api::services::{cart_service, order_service};
use uuid::Uuid;

async fn test_pool() -> PgPool {
  let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for integration tests");
  PgPool::connect(&url).await.expect("failed to connect to test database")
}

async fn create_user(pool: &PgPool) -> Uuid {
  sqlx::query_scalar(
    "INSERT INTO users (email, password_hash) VALUES ($1, 'x') RETURNING id",
  )
  .bind(format!("test-{}@example.com", Uuid::new_v4()))
  .fetch_one(pool)
  .await
  .expect("failed to insert test user")
}

async fn create_product(pool: &PgPool, name: &str, price_cents: i32, stock_quantity: i32) -> Uuid {
  sqlx::query_scalar(
    "INSERT INTO products (name, price_cents, stock_quantity) VALUES ($1, $2, $3) RETURNING id",
  )
  .bind(name)
  .bind(price_cents)
  .bind(stock_quantity)
  .fetch_one(pool)
  .await
  .expect("failed to insert test product")
}

async fn add_cart_line(pool: &PgPool, user_id: Uuid, product_id: Uuid, quantity: i32) {
  sqlx::query("INSERT INTO cart_items (user_id, product_id, quantity) VALUES ($1, $2, $3)")
    .bind(user_id)
    .bind(product_id)
    .bind(quantity)
    .execute(pool)
    .await
    .expect("failed to insert cart line");
}

async fn stock_of(pool: &PgPool, product_id: Uuid) -> i32 {
  sqlx::query_scalar("SELECT stock_quantity FROM products WHERE id = $1")
    .bind(product_id)
    .fetch_one(pool)
    .await
    .expect("failed to read stock")
}

async fn cart_line_count(pool: &PgPool, user_id: Uuid) -> i64 {
  sqlx::query_scalar("SELECT COUNT(*) FROM cart_items WHERE user_id = $1")
    .bind(user_id)
    .fetch_one(pool)
    .await
    .expect("failed to count cart lines")
}

async fn order_count(pool: &PgPool, user_id: Uuid) -> i64 {
  sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE user_id = $1")
    .bind(user_id)
    .fetch_one(pool)
    .await
    .expect("failed to count orders")
}

#[tokio::test]
#[ignore = "requires a running Postgres with schema.sql applied"]
#[serial_test::serial]
async fn successful_placement_snapshots_prices_and_decrements_stock() {
  let pool = test_pool().await;
  let user_id = create_user(&pool).await;
  let product_a = create_product(&pool, "ProductA", 1000, 5).await;
  let product_b = create_product(&pool, "ProductB", 500, 5).await;
  add_cart_line(&pool, user_id, product_a, 2).await;
  add_cart_line(&pool, user_id, product_b, 1).await;

  let detail = order_service::place_order(&pool, user_id, "1 Test Street")
    .await
    .expect("placement should succeed");

  // 2 x $10.00 + 1 x $5.00 = $25.00
  assert_eq!(detail.order.total_amount_cents, 2500);
  assert_eq!(detail.items.len(), 2);
  let line_sum: i64 = detail
    .items
    .iter()
    .map(|l| i64::from(l.price_at_purchase_cents) * i64::from(l.quantity))
    .sum();
  assert_eq!(line_sum, detail.order.total_amount_cents);

  assert_eq!(stock_of(&pool, product_a).await, 3);
  assert_eq!(stock_of(&pool, product_b).await, 4);
  assert_eq!(cart_line_count(&pool, user_id).await, 0);

  // Raising the catalog price must not rewrite the snapshot.
  sqlx::query("UPDATE products SET price_cents = 9999 WHERE id = $1")
    .bind(product_a)
    .execute(&pool)
    .await
    .unwrap();
  let refetched = order_service::get_order(&pool, user_id, detail.order.id)
    .await
    .expect("order should be readable");
  assert_eq!(refetched.order.total_amount_cents, 2500);
  let line_a = refetched.items.iter().find(|l| l.product_id == product_a).unwrap();
  assert_eq!(line_a.price_at_purchase_cents, 1000);
}

#[tokio::test]
#[ignore = "requires a running Postgres with schema.sql applied"]
#[serial_test::serial]
async fn empty_cart_placement_creates_nothing() {
  let pool = test_pool().await;
  let user_id = create_user(&pool).await;

  let result = order_service::place_order(&pool, user_id, "1 Test Street").await;
  assert!(matches!(result, Err(AppError::EmptyCart)));
  assert_eq!(order_count(&pool, user_id).await, 0);
}

#[tokio::test]
#[ignore = "requires a running Postgres with schema.sql applied"]
#[serial_test::serial]
async fn insufficient_stock_leaves_everything_unchanged() {
  let pool = test_pool().await;
  let user_id = create_user(&pool).await;
  let product_a = create_product(&pool, "ProductA", 1000, 5).await;
  add_cart_line(&pool, user_id, product_a, 10).await;

  let result = order_service::place_order(&pool, user_id, "1 Test Street").await;
  match result {
    Err(AppError::InsufficientStock {
      product_id,
      available,
      requested,
      ..
    }) => {
      assert_eq!(product_id, product_a);
      assert_eq!(available, 5);
      assert_eq!(requested, 10);
    }
    other => panic!("expected InsufficientStock, got {:?}", other),
  }

  assert_eq!(stock_of(&pool, product_a).await, 5);
  assert_eq!(cart_line_count(&pool, user_id).await, 1);
  assert_eq!(order_count(&pool, user_id).await, 0);
}

#[tokio::test]
#[ignore = "requires a running Postgres with schema.sql applied"]
#[serial_test::serial]
async fn concurrent_placements_never_drive_stock_negative() {
  let pool = test_pool().await;
  let product_c = create_product(&pool, "ProductC", 700, 5).await;

  let user_one = create_user(&pool).await;
  let user_two = create_user(&pool).await;
  add_cart_line(&pool, user_one, product_c, 3).await;
  add_cart_line(&pool, user_two, product_c, 3).await;

  let (first, second) = tokio::join!(
    order_service::place_order(&pool, user_one, "1 Test Street"),
    order_service::place_order(&pool, user_two, "2 Test Street"),
  );

  let successes = [first.is_ok(), second.is_ok()].iter().filter(|ok| **ok).count();
  assert_eq!(successes, 1, "exactly one of two contending placements may succeed");

  for result in [first, second] {
    if let Err(err) = result {
      assert!(
        matches!(err, AppError::InsufficientStock { .. } | AppError::Conflict),
        "loser must fail with a clean, retryable error, got {err}"
      );
    }
  }

  let final_stock = stock_of(&pool, product_c).await;
  assert_eq!(final_stock, 2);
  assert!(final_stock >= 0);
}

#[tokio::test]
#[ignore = "requires a running Postgres with schema.sql applied"]
#[serial_test::serial]
async fn cart_courtesy_check_rejects_over_stock_requests() {
  let pool = test_pool().await;
  let user_id = create_user(&pool).await;
  let product = create_product(&pool, "Scarce", 1500, 2).await;

  cart_service::add_item(&pool, user_id, product, 2)
    .await
    .expect("adding within stock should succeed");
  let result = cart_service::add_item(&pool, user_id, product, 1).await;
  assert!(matches!(result, Err(AppError::InsufficientStock { .. })));

  // Clearing an empty cart is a no-op success.
  cart_service::clear(&pool, user_id).await.unwrap();
  cart_service::clear(&pool, user_id).await.unwrap();
  assert_eq!(cart_line_count(&pool, user_id).await, 0);

  // Removing a line that does not exist is NotFound.
  let result = cart_service::remove_item(&pool, user_id, Uuid::new_v4()).await;
  assert!(matches!(result, Err(AppError::NotFound(_))));
}
