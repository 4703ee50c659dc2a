use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CartItem {
  pub id: Uuid,
  pub user_id: Uuid,
  pub product_id: Uuid,
  pub quantity: i32,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// A cart item joined with the catalog fields the client needs to render it.
/// The stock here is informational only; availability is re-checked at
/// order placement.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CartLine {
  pub id: Uuid,
  pub product_id: Uuid,
  pub name: String,
  pub price_cents: i32,
  pub image_url: Option<String>,
  pub stock_quantity: i32,
  pub quantity: i32,
}
