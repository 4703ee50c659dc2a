use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OrderItem {
  pub id: Uuid,
  pub order_id: Uuid,
  pub product_id: Uuid,
  pub quantity: i32,
  /// Snapshot of the unit price when the order was placed, deliberately
  /// decoupled from the live catalog price.
  pub price_at_purchase_cents: i32,
}

/// An order item joined with catalog display fields for order listings.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OrderLineDetail {
  pub id: Uuid,
  pub order_id: Uuid,
  pub product_id: Uuid,
  pub name: String,
  pub image_url: Option<String>,
  pub quantity: i32,
  pub price_at_purchase_cents: i32,
}
