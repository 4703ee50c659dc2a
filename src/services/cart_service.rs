//! Per-user cart maintenance.
//!
//! The cart is advisory state: the stock checks here are a courtesy to the
//! client and can go stale before checkout. Availability is enforced for
//! real, under row locks, by `order_service::place_order`.

use crate::errors::{AppError, Result};
use crate::models::{CartItem, CartLine, Product};
use serde::Serialize;
use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct CartView {
  pub items: Vec<CartLine>,
  pub total_cents: i64,
  pub count: usize,
}

const CART_LINE_COLUMNS: &str = "ci.id, ci.product_id, p.name, p.price_cents, p.image_url, p.stock_quantity, ci.quantity";

/// The user's cart joined with catalog display fields, newest first.
#[instrument(name = "cart_service::get_cart", skip(pool), fields(user_id = %user_id))]
pub async fn get_cart(pool: &PgPool, user_id: Uuid) -> Result<CartView> {
  let items: Vec<CartLine> = sqlx::query_as(&format!(
    "SELECT {CART_LINE_COLUMNS} \
     FROM cart_items ci \
     JOIN products p ON p.id = ci.product_id \
     WHERE ci.user_id = $1 \
     ORDER BY ci.created_at DESC"
  ))
  .bind(user_id)
  .fetch_all(pool)
  .await?;

  let total_cents = items
    .iter()
    .map(|l| i64::from(l.price_cents) * i64::from(l.quantity))
    .sum();

  Ok(CartView {
    count: items.len(),
    total_cents,
    items,
  })
}

/// Adds `quantity` of a product to the cart, merging into an existing line.
/// Rejects requests that would exceed the stock visible right now; this is
/// not a reservation.
#[instrument(name = "cart_service::add_item", skip(pool), fields(user_id = %user_id, product_id = %product_id, quantity))]
pub async fn add_item(pool: &PgPool, user_id: Uuid, product_id: Uuid, quantity: i32) -> Result<CartLine> {
  let product: Option<Product> = sqlx::query_as(
    "SELECT id, name, description, price_cents, stock_quantity, category, image_url, created_at, updated_at \
     FROM products WHERE id = $1",
  )
  .bind(product_id)
  .fetch_optional(pool)
  .await?;
  let product = product.ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

  let existing_quantity: Option<i32> =
    sqlx::query_scalar("SELECT quantity FROM cart_items WHERE user_id = $1 AND product_id = $2")
      .bind(user_id)
      .bind(product_id)
      .fetch_optional(pool)
      .await?;

  let new_quantity = existing_quantity.unwrap_or(0) + quantity;
  if product.stock_quantity < new_quantity {
    return Err(AppError::InsufficientStock {
      product_id: product.id,
      name: product.name,
      available: product.stock_quantity,
      requested: new_quantity,
    });
  }

  let item: CartItem = sqlx::query_as(
    "INSERT INTO cart_items (user_id, product_id, quantity) \
     VALUES ($1, $2, $3) \
     ON CONFLICT (user_id, product_id) \
     DO UPDATE SET quantity = $3, updated_at = NOW() \
     RETURNING id, user_id, product_id, quantity, created_at, updated_at",
  )
  .bind(user_id)
  .bind(product_id)
  .bind(new_quantity)
  .fetch_one(pool)
  .await?;

  info!(cart_item_id = %item.id, new_quantity, "Cart item added/merged.");

  Ok(CartLine {
    id: item.id,
    product_id: product.id,
    name: product.name,
    price_cents: product.price_cents,
    image_url: product.image_url,
    stock_quantity: product.stock_quantity,
    quantity: item.quantity,
  })
}

/// Sets a cart line's quantity directly. The line must belong to the caller.
#[instrument(name = "cart_service::update_item", skip(pool), fields(user_id = %user_id, cart_item_id = %cart_item_id, quantity))]
pub async fn update_item(pool: &PgPool, user_id: Uuid, cart_item_id: Uuid, quantity: i32) -> Result<CartLine> {
  let line: Option<CartLine> = sqlx::query_as(&format!(
    "SELECT {CART_LINE_COLUMNS} \
     FROM cart_items ci \
     JOIN products p ON p.id = ci.product_id \
     WHERE ci.id = $1 AND ci.user_id = $2"
  ))
  .bind(cart_item_id)
  .bind(user_id)
  .fetch_optional(pool)
  .await?;
  let line = line.ok_or_else(|| AppError::NotFound("Cart item not found".to_string()))?;

  if line.stock_quantity < quantity {
    return Err(AppError::InsufficientStock {
      product_id: line.product_id,
      name: line.name,
      available: line.stock_quantity,
      requested: quantity,
    });
  }

  sqlx::query("UPDATE cart_items SET quantity = $1, updated_at = NOW() WHERE id = $2")
    .bind(quantity)
    .bind(cart_item_id)
    .execute(pool)
    .await?;

  Ok(CartLine { quantity, ..line })
}

/// Deletes one cart line; `NotFound` if it does not exist for this user.
#[instrument(name = "cart_service::remove_item", skip(pool), fields(user_id = %user_id, cart_item_id = %cart_item_id))]
pub async fn remove_item(pool: &PgPool, user_id: Uuid, cart_item_id: Uuid) -> Result<()> {
  let deleted = sqlx::query("DELETE FROM cart_items WHERE id = $1 AND user_id = $2")
    .bind(cart_item_id)
    .bind(user_id)
    .execute(pool)
    .await?;

  if deleted.rows_affected() == 0 {
    return Err(AppError::NotFound("Cart item not found".to_string()));
  }
  Ok(())
}

/// Deletes every line for the user. Clearing an empty cart is a no-op success.
#[instrument(name = "cart_service::clear", skip(pool), fields(user_id = %user_id))]
pub async fn clear(pool: &PgPool, user_id: Uuid) -> Result<()> {
  sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
    .bind(user_id)
    .execute(pool)
    .await?;
  Ok(())
}
