use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type as SqlxType};
use uuid::Uuid;

// Matches the `order_status_enum` Postgres type in schema.sql. No transition
// rules are enforced between values; any status may follow any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "order_status_enum", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
  Pending,
  Processing,
  Shipped,
  Delivered,
  Cancelled,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Order {
  pub id: Uuid,
  pub user_id: Uuid,
  pub status: OrderStatus,
  /// Computed once by order placement; immutable afterwards.
  pub total_amount_cents: i64,
  pub shipping_address: String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn status_serializes_lowercase() {
    assert_eq!(serde_json::to_string(&OrderStatus::Pending).unwrap(), "\"pending\"");
    assert_eq!(serde_json::to_string(&OrderStatus::Cancelled).unwrap(), "\"cancelled\"");
  }

  #[test]
  fn status_rejects_unknown_values() {
    assert!(serde_json::from_str::<OrderStatus>("\"shipped\"").is_ok());
    assert!(serde_json::from_str::<OrderStatus>("\"refunded\"").is_err());
    assert!(serde_json::from_str::<OrderStatus>("\"Pending\"").is_err());
  }
}
