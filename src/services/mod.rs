//! Business logic, kept free of HTTP concerns. Handlers validate payloads and
//! pass strongly-typed arguments down; services talk to Postgres.

pub mod auth_service;
pub mod cart_service;
pub mod order_service;
pub mod product_service;
pub mod token_service;

use serde::Serialize;

/// Pagination envelope for administrative and catalog listings.
#[derive(Debug, Serialize)]
pub struct Pagination {
  pub total: i64,
  pub page: i64,
  pub limit: i64,
  pub pages: i64,
}

impl Pagination {
  pub fn new(total: i64, page: i64, limit: i64) -> Self {
    Self {
      total,
      page,
      limit,
      pages: (total + limit - 1) / limit.max(1),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn pagination_rounds_pages_up() {
    assert_eq!(Pagination::new(41, 1, 20).pages, 3);
    assert_eq!(Pagination::new(40, 2, 20).pages, 2);
    assert_eq!(Pagination::new(0, 1, 20).pages, 0);
  }
}
