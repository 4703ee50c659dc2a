//! Development seeding, enabled with `SEED_DB=true`. Runs only when the
//! catalog is empty so restarts do not duplicate data.

use crate::errors::Result;
use crate::services::auth_service;
use sqlx::PgPool;
use tracing::{info, instrument};

#[instrument(name = "seed::run", skip(pool))]
pub async fn run(pool: &PgPool) -> Result<()> {
  let product_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products").fetch_one(pool).await?;
  if product_count > 0 {
    info!("Seed skipped: products table is not empty.");
    return Ok(());
  }

  let admin_hash = auth_service::hash_password("admin123")?;
  sqlx::query(
    "INSERT INTO users (email, password_hash, first_name, last_name, is_admin) \
     VALUES ($1, $2, 'Admin', 'User', TRUE) \
     ON CONFLICT (email) DO NOTHING",
  )
  .bind("admin@example.com")
  .bind(&admin_hash)
  .execute(pool)
  .await?;

  let user_hash = auth_service::hash_password("user123")?;
  sqlx::query(
    "INSERT INTO users (email, password_hash, first_name, last_name, is_admin) \
     VALUES ($1, $2, 'John', 'Doe', FALSE) \
     ON CONFLICT (email) DO NOTHING",
  )
  .bind("user@example.com")
  .bind(&user_hash)
  .execute(pool)
  .await?;

  let products: [(&str, &str, i32, i32, &str); 4] = [
    (
      "Wireless Headphones",
      "High-quality wireless headphones with noise cancellation",
      9999,
      50,
      "Electronics",
    ),
    (
      "Smart Watch",
      "Feature-rich smartwatch with fitness tracking",
      19999,
      30,
      "Electronics",
    ),
    (
      "Laptop Backpack",
      "Durable backpack with laptop compartment",
      4999,
      100,
      "Accessories",
    ),
    (
      "Mechanical Keyboard",
      "Tactile mechanical keyboard with RGB lighting",
      12999,
      40,
      "Electronics",
    ),
  ];

  for (name, description, price_cents, stock_quantity, category) in products {
    sqlx::query(
      "INSERT INTO products (name, description, price_cents, stock_quantity, category) \
       VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(name)
    .bind(description)
    .bind(price_cents)
    .bind(stock_quantity)
    .bind(category)
    .execute(pool)
    .await?;
  }

  info!("Database seeded with sample users and products.");
  Ok(())
}
