//! Catalog queries and administrative CRUD. Stock here is written directly
//! by administrators; the order transaction is the only other writer.

use crate::errors::{AppError, Result};
use crate::models::Product;
use crate::services::Pagination;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

const PRODUCT_COLUMNS: &str = "id, name, description, price_cents, stock_quantity, category, image_url, created_at, updated_at";

#[derive(Debug)]
pub struct NewProduct {
  pub name: String,
  pub description: Option<String>,
  pub price_cents: i32,
  pub stock_quantity: i32,
  pub category: Option<String>,
  pub image_url: Option<String>,
}

#[derive(Debug, Default)]
pub struct ProductChanges {
  pub name: Option<String>,
  pub description: Option<String>,
  pub price_cents: Option<i32>,
  pub stock_quantity: Option<i32>,
  pub category: Option<String>,
  pub image_url: Option<String>,
}

/// Paginated catalog listing with an optional category filter and an
/// optional case-insensitive substring search over name and description.
#[instrument(name = "product_service::list", skip(pool))]
pub async fn list(
  pool: &PgPool,
  page: i64,
  limit: i64,
  category: Option<String>,
  search: Option<String>,
) -> Result<(Vec<Product>, Pagination)> {
  let offset = (page - 1) * limit;
  let pattern = search.map(|s| format!("%{}%", s));

  let total: i64 = sqlx::query_scalar(
    "SELECT COUNT(*) FROM products \
     WHERE ($1::text IS NULL OR category = $1) \
       AND ($2::text IS NULL OR name ILIKE $2 OR description ILIKE $2)",
  )
  .bind(&category)
  .bind(&pattern)
  .fetch_one(pool)
  .await?;

  let products: Vec<Product> = sqlx::query_as(&format!(
    "SELECT {PRODUCT_COLUMNS} FROM products \
     WHERE ($1::text IS NULL OR category = $1) \
       AND ($2::text IS NULL OR name ILIKE $2 OR description ILIKE $2) \
     ORDER BY created_at DESC \
     LIMIT $3 OFFSET $4"
  ))
  .bind(&category)
  .bind(&pattern)
  .bind(limit)
  .bind(offset)
  .fetch_all(pool)
  .await?;

  Ok((products, Pagination::new(total, page, limit)))
}

#[instrument(name = "product_service::get", skip(pool), fields(product_id = %product_id))]
pub async fn get(pool: &PgPool, product_id: Uuid) -> Result<Product> {
  let product: Option<Product> = sqlx::query_as(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"))
    .bind(product_id)
    .fetch_optional(pool)
    .await?;
  product.ok_or_else(|| AppError::NotFound("Product not found".to_string()))
}

/// Distinct non-null categories present in the catalog.
#[instrument(name = "product_service::categories", skip(pool))]
pub async fn categories(pool: &PgPool) -> Result<Vec<String>> {
  let categories: Vec<String> =
    sqlx::query_scalar("SELECT DISTINCT category FROM products WHERE category IS NOT NULL ORDER BY category")
      .fetch_all(pool)
      .await?;
  Ok(categories)
}

#[instrument(name = "product_service::create", skip(pool, new))]
pub async fn create(pool: &PgPool, new: NewProduct) -> Result<Product> {
  let product: Product = sqlx::query_as(&format!(
    "INSERT INTO products (name, description, price_cents, stock_quantity, category, image_url) \
     VALUES ($1, $2, $3, $4, $5, $6) \
     RETURNING {PRODUCT_COLUMNS}"
  ))
  .bind(new.name)
  .bind(new.description)
  .bind(new.price_cents)
  .bind(new.stock_quantity)
  .bind(new.category)
  .bind(new.image_url)
  .fetch_one(pool)
  .await?;
  Ok(product)
}

/// Partial update; absent fields keep their current values.
#[instrument(name = "product_service::update", skip(pool, changes), fields(product_id = %product_id))]
pub async fn update(pool: &PgPool, product_id: Uuid, changes: ProductChanges) -> Result<Product> {
  let product: Option<Product> = sqlx::query_as(&format!(
    "UPDATE products SET \
       name = COALESCE($1, name), \
       description = COALESCE($2, description), \
       price_cents = COALESCE($3, price_cents), \
       stock_quantity = COALESCE($4, stock_quantity), \
       category = COALESCE($5, category), \
       image_url = COALESCE($6, image_url), \
       updated_at = NOW() \
     WHERE id = $7 \
     RETURNING {PRODUCT_COLUMNS}"
  ))
  .bind(changes.name)
  .bind(changes.description)
  .bind(changes.price_cents)
  .bind(changes.stock_quantity)
  .bind(changes.category)
  .bind(changes.image_url)
  .bind(product_id)
  .fetch_optional(pool)
  .await?;
  product.ok_or_else(|| AppError::NotFound("Product not found".to_string()))
}

#[instrument(name = "product_service::delete", skip(pool), fields(product_id = %product_id))]
pub async fn delete(pool: &PgPool, product_id: Uuid) -> Result<()> {
  let deleted = sqlx::query("DELETE FROM products WHERE id = $1")
    .bind(product_id)
    .execute(pool)
    .await?;
  if deleted.rows_affected() == 0 {
    return Err(AppError::NotFound("Product not found".to_string()));
  }
  Ok(())
}
