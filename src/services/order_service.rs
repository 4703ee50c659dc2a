//! Order placement and order queries.
//!
//! Placement is the one multi-step, all-or-nothing operation in the system:
//! it reads the cart joined with the live catalog under row locks, validates
//! stock, snapshots prices, decrements inventory, and clears the cart inside
//! a single Postgres transaction. Concurrent placements contending for the
//! same product serialize on the product row locks; a serialization failure
//! or deadlock surfaces as `AppError::Conflict` and is safe to retry because
//! nothing escaped the transaction.

use crate::errors::{map_tx_error, AppError, Result};
use crate::models::{Order, OrderLineDetail, OrderStatus};
use crate::services::Pagination;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use std::collections::HashMap;
use tracing::{info, instrument};
use uuid::Uuid;

/// One cart line joined with the product fields read under lock.
#[derive(Debug, Clone, FromRow)]
pub(crate) struct CheckoutLine {
  pub product_id: Uuid,
  pub quantity: i32,
  pub name: String,
  pub image_url: Option<String>,
  pub price_cents: i32,
  pub stock_quantity: i32,
}

#[derive(Debug, Serialize)]
pub struct OrderDetail {
  #[serde(flatten)]
  pub order: Order,
  pub items: Vec<OrderLineDetail>,
}

#[derive(Debug, Serialize)]
pub struct AdminOrderDetail {
  #[serde(flatten)]
  pub order: Order,
  pub user_email: String,
  pub items: Vec<OrderLineDetail>,
}

/// Validates every line against the stock read under lock and computes the
/// order total in cents. Fails without side effects; the caller owns the
/// transaction.
pub(crate) fn verify_stock_and_total(lines: &[CheckoutLine]) -> Result<i64> {
  if lines.is_empty() {
    return Err(AppError::EmptyCart);
  }
  let mut total: i64 = 0;
  for line in lines {
    if line.stock_quantity < line.quantity {
      return Err(AppError::InsufficientStock {
        product_id: line.product_id,
        name: line.name.clone(),
        available: line.stock_quantity,
        requested: line.quantity,
      });
    }
    total += i64::from(line.price_cents) * i64::from(line.quantity);
  }
  Ok(total)
}

/// Converts the user's cart into a durable order, atomically.
#[instrument(name = "order_service::place_order", skip(pool, shipping_address), fields(user_id = %user_id))]
pub async fn place_order(pool: &PgPool, user_id: Uuid, shipping_address: &str) -> Result<OrderDetail> {
  let mut tx = pool.begin().await?;

  // One consistent read of the cart and the referenced catalog rows. The
  // FOR UPDATE lock on products serializes this check against concurrent
  // placements; ordering by product_id keeps the lock order deterministic.
  let lines: Vec<CheckoutLine> = sqlx::query_as(
    "SELECT ci.product_id, ci.quantity, p.name, p.image_url, p.price_cents, p.stock_quantity \
     FROM cart_items ci \
     JOIN products p ON p.id = ci.product_id \
     WHERE ci.user_id = $1 \
     ORDER BY ci.product_id \
     FOR UPDATE OF p",
  )
  .bind(user_id)
  .fetch_all(&mut *tx)
  .await
  .map_err(map_tx_error)?;

  let total_amount_cents = verify_stock_and_total(&lines)?;

  let order: Order = sqlx::query_as(
    "INSERT INTO orders (user_id, status, total_amount_cents, shipping_address) \
     VALUES ($1, 'pending', $2, $3) \
     RETURNING id, user_id, status, total_amount_cents, shipping_address, created_at, updated_at",
  )
  .bind(user_id)
  .bind(total_amount_cents)
  .bind(shipping_address)
  .fetch_one(&mut *tx)
  .await
  .map_err(map_tx_error)?;

  let mut items = Vec::with_capacity(lines.len());
  for line in &lines {
    let item_id: Uuid = sqlx::query_scalar(
      "INSERT INTO order_items (order_id, product_id, quantity, price_at_purchase_cents) \
       VALUES ($1, $2, $3, $4) \
       RETURNING id",
    )
    .bind(order.id)
    .bind(line.product_id)
    .bind(line.quantity)
    .bind(line.price_cents)
    .fetch_one(&mut *tx)
    .await
    .map_err(map_tx_error)?;

    items.push(OrderLineDetail {
      id: item_id,
      order_id: order.id,
      product_id: line.product_id,
      name: line.name.clone(),
      image_url: line.image_url.clone(),
      quantity: line.quantity,
      price_at_purchase_cents: line.price_cents,
    });
  }

  for line in &lines {
    // The rows are locked and already validated, so this always matches;
    // the stock_quantity guard keeps the invariant even if it did not.
    let updated = sqlx::query(
      "UPDATE products \
       SET stock_quantity = stock_quantity - $1, updated_at = NOW() \
       WHERE id = $2 AND stock_quantity >= $1",
    )
    .bind(line.quantity)
    .bind(line.product_id)
    .execute(&mut *tx)
    .await
    .map_err(map_tx_error)?;

    if updated.rows_affected() != 1 {
      return Err(AppError::Conflict);
    }
  }

  sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
    .bind(user_id)
    .execute(&mut *tx)
    .await
    .map_err(map_tx_error)?;

  tx.commit().await.map_err(map_tx_error)?;

  info!(
    order_id = %order.id,
    total_amount_cents,
    line_count = items.len(),
    "Order placed."
  );

  Ok(OrderDetail { order, items })
}

async fn fetch_lines_for_orders(pool: &PgPool, order_ids: &[Uuid]) -> Result<Vec<OrderLineDetail>> {
  let lines: Vec<OrderLineDetail> = sqlx::query_as(
    "SELECT oi.id, oi.order_id, oi.product_id, p.name, p.image_url, oi.quantity, oi.price_at_purchase_cents \
     FROM order_items oi \
     JOIN products p ON p.id = oi.product_id \
     WHERE oi.order_id = ANY($1)",
  )
  .bind(order_ids)
  .fetch_all(pool)
  .await?;
  Ok(lines)
}

fn group_lines_by_order(lines: Vec<OrderLineDetail>) -> HashMap<Uuid, Vec<OrderLineDetail>> {
  let mut grouped: HashMap<Uuid, Vec<OrderLineDetail>> = HashMap::new();
  for line in lines {
    grouped.entry(line.order_id).or_default().push(line);
  }
  grouped
}

/// All orders belonging to `user_id`, newest first.
#[instrument(name = "order_service::list_orders", skip(pool), fields(user_id = %user_id))]
pub async fn list_orders(pool: &PgPool, user_id: Uuid) -> Result<Vec<OrderDetail>> {
  let orders: Vec<Order> = sqlx::query_as(
    "SELECT id, user_id, status, total_amount_cents, shipping_address, created_at, updated_at \
     FROM orders WHERE user_id = $1 ORDER BY created_at DESC",
  )
  .bind(user_id)
  .fetch_all(pool)
  .await?;

  let ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
  let mut grouped = group_lines_by_order(fetch_lines_for_orders(pool, &ids).await?);
  Ok(
    orders
      .into_iter()
      .map(|order| {
        let items = grouped.remove(&order.id).unwrap_or_default();
        OrderDetail { order, items }
      })
      .collect(),
  )
}

/// A single order, scoped to its owner.
#[instrument(name = "order_service::get_order", skip(pool), fields(user_id = %user_id, order_id = %order_id))]
pub async fn get_order(pool: &PgPool, user_id: Uuid, order_id: Uuid) -> Result<OrderDetail> {
  let order: Option<Order> = sqlx::query_as(
    "SELECT id, user_id, status, total_amount_cents, shipping_address, created_at, updated_at \
     FROM orders WHERE id = $1 AND user_id = $2",
  )
  .bind(order_id)
  .bind(user_id)
  .fetch_optional(pool)
  .await?;

  let order = order.ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;
  let items = fetch_lines_for_orders(pool, &[order.id]).await?;
  Ok(OrderDetail { order, items })
}

/// Administrative listing across all users, paginated, optionally filtered
/// by status.
#[instrument(name = "order_service::list_all_orders", skip(pool))]
pub async fn list_all_orders(
  pool: &PgPool,
  page: i64,
  limit: i64,
  status: Option<OrderStatus>,
) -> Result<(Vec<AdminOrderDetail>, Pagination)> {
  let offset = (page - 1) * limit;

  let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE ($1::order_status_enum IS NULL OR status = $1)")
    .bind(status)
    .fetch_one(pool)
    .await?;

  #[derive(FromRow)]
  struct OrderWithEmail {
    #[sqlx(flatten)]
    order: Order,
    user_email: String,
  }

  let rows: Vec<OrderWithEmail> = sqlx::query_as(
    "SELECT o.id, o.user_id, o.status, o.total_amount_cents, o.shipping_address, o.created_at, o.updated_at, \
            u.email AS user_email \
     FROM orders o \
     JOIN users u ON u.id = o.user_id \
     WHERE ($1::order_status_enum IS NULL OR o.status = $1) \
     ORDER BY o.created_at DESC \
     LIMIT $2 OFFSET $3",
  )
  .bind(status)
  .bind(limit)
  .bind(offset)
  .fetch_all(pool)
  .await?;

  let ids: Vec<Uuid> = rows.iter().map(|r| r.order.id).collect();
  let mut grouped = group_lines_by_order(fetch_lines_for_orders(pool, &ids).await?);

  let orders = rows
    .into_iter()
    .map(|row| {
      let items = grouped.remove(&row.order.id).unwrap_or_default();
      AdminOrderDetail {
        order: row.order,
        user_email: row.user_email,
        items,
      }
    })
    .collect();

  Ok((orders, Pagination::new(total, page, limit)))
}

/// Administrative status change. The five known statuses are the only
/// constraint; no transition graph is enforced.
#[instrument(name = "order_service::update_status", skip(pool), fields(order_id = %order_id, status = ?status))]
pub async fn update_status(pool: &PgPool, order_id: Uuid, status: OrderStatus) -> Result<Order> {
  let order: Option<Order> = sqlx::query_as(
    "UPDATE orders SET status = $1, updated_at = NOW() WHERE id = $2 \
     RETURNING id, user_id, status, total_amount_cents, shipping_address, created_at, updated_at",
  )
  .bind(status)
  .bind(order_id)
  .fetch_optional(pool)
  .await?;

  order.ok_or_else(|| AppError::NotFound("Order not found".to_string()))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn line(name: &str, quantity: i32, price_cents: i32, stock_quantity: i32) -> CheckoutLine {
    CheckoutLine {
      product_id: Uuid::new_v4(),
      quantity,
      name: name.to_string(),
      image_url: None,
      price_cents,
      stock_quantity,
    }
  }

  #[test]
  fn empty_cart_fails_placement() {
    assert!(matches!(verify_stock_and_total(&[]), Err(AppError::EmptyCart)));
  }

  #[test]
  fn total_sums_price_times_quantity() {
    // 2 x $10.00 + 1 x $5.00 = $25.00
    let lines = vec![line("A", 2, 1000, 5), line("B", 1, 500, 5)];
    assert_eq!(verify_stock_and_total(&lines).unwrap(), 2500);
  }

  #[test]
  fn insufficient_stock_names_the_offending_product() {
    let lines = vec![line("ProductA", 10, 1000, 5)];
    match verify_stock_and_total(&lines) {
      Err(AppError::InsufficientStock {
        name,
        available,
        requested,
        ..
      }) => {
        assert_eq!(name, "ProductA");
        assert_eq!(available, 5);
        assert_eq!(requested, 10);
      }
      other => panic!("expected InsufficientStock, got {:?}", other),
    }
  }

  #[test]
  fn one_bad_line_fails_the_whole_cart() {
    let lines = vec![line("Fine", 1, 100, 10), line("Short", 3, 100, 2)];
    assert!(matches!(
      verify_stock_and_total(&lines),
      Err(AppError::InsufficientStock { .. })
    ));
  }

  #[test]
  fn quantity_equal_to_stock_is_allowed() {
    let lines = vec![line("Exact", 5, 250, 5)];
    assert_eq!(verify_stock_and_total(&lines).unwrap(), 1250);
  }

  #[test]
  fn total_does_not_overflow_i32() {
    let lines = vec![line("Bulk", 2_000_000, 2_000, 2_000_000)];
    assert_eq!(verify_stock_and_total(&lines).unwrap(), 4_000_000_000);
  }
}
