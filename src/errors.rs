use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Authentication Failed: {0}")]
  Auth(String),

  #[error("Forbidden: {0}")]
  Forbidden(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Cart is empty")]
  EmptyCart,

  #[error("Insufficient stock for {name}: {available} available, {requested} requested")]
  InsufficientStock {
    product_id: Uuid,
    name: String,
    available: i32,
    requested: i32,
  },

  #[error("Concurrent modification detected, retry the request")]
  Conflict,

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl AppError {
  pub fn status(&self) -> StatusCode {
    match self {
      AppError::Validation(_) | AppError::EmptyCart | AppError::InsufficientStock { .. } => StatusCode::BAD_REQUEST,
      AppError::Auth(_) => StatusCode::UNAUTHORIZED,
      AppError::Forbidden(_) => StatusCode::FORBIDDEN,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::Conflict => StatusCode::CONFLICT,
      AppError::Sqlx(_) | AppError::Config(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

// Allow anyhow::Error to be converted into AppError::Internal for convenience
// in code that uses `?` on functions returning anyhow::Result.
impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    match err.downcast::<sqlx::Error>() {
      Ok(sqlx_err) => AppError::Sqlx(sqlx_err),
      Err(other) => AppError::Internal(other.to_string()),
    }
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    self.status()
  }

  fn error_response(&self) -> HttpResponse {
    tracing::error!(application_error = %self, "Responding with error");
    match self {
      AppError::Validation(m) => HttpResponse::BadRequest().json(json!({ "error": m })),
      AppError::Auth(m) => HttpResponse::Unauthorized().json(json!({ "error": m })),
      AppError::Forbidden(m) => HttpResponse::Forbidden().json(json!({ "error": m })),
      AppError::NotFound(m) => HttpResponse::NotFound().json(json!({ "error": m })),
      AppError::EmptyCart => HttpResponse::BadRequest().json(json!({ "error": "Cart is empty" })),
      AppError::InsufficientStock {
        product_id,
        name,
        available,
        requested,
      } => HttpResponse::BadRequest().json(json!({
        "error": format!("Insufficient stock for {}", name),
        "productId": product_id,
        "available": available,
        "requested": requested,
      })),
      AppError::Conflict => {
        HttpResponse::Conflict().json(json!({ "error": "The request conflicted with a concurrent update, please retry" }))
      }
      AppError::Sqlx(_) => HttpResponse::InternalServerError().json(json!({ "error": "Database operation failed" })),
      AppError::Config(_) => HttpResponse::InternalServerError().json(json!({ "error": "Configuration issue" })),
      AppError::Internal(_) => HttpResponse::InternalServerError().json(json!({ "error": "An internal error occurred" })),
    }
  }
}

// Define a Result type alias for the application
pub type Result<T, E = AppError> = std::result::Result<T, E>;

/// Postgres reports serialization failures as 40001 and deadlocks as 40P01;
/// both mean the enclosing transaction rolled back cleanly and may be retried.
pub fn map_tx_error(err: sqlx::Error) -> AppError {
  if let sqlx::Error::Database(ref db_err) = err {
    if matches!(db_err.code().as_deref(), Some("40001") | Some("40P01")) {
      return AppError::Conflict;
    }
  }
  AppError::Sqlx(err)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn client_errors_map_to_4xx() {
    assert_eq!(AppError::Validation("bad".into()).status(), StatusCode::BAD_REQUEST);
    assert_eq!(AppError::EmptyCart.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
      AppError::InsufficientStock {
        product_id: Uuid::new_v4(),
        name: "Widget".into(),
        available: 1,
        requested: 3,
      }
      .status(),
      StatusCode::BAD_REQUEST
    );
    assert_eq!(AppError::Auth("no token".into()).status(), StatusCode::UNAUTHORIZED);
    assert_eq!(AppError::Forbidden("admins only".into()).status(), StatusCode::FORBIDDEN);
    assert_eq!(AppError::NotFound("order".into()).status(), StatusCode::NOT_FOUND);
    assert_eq!(AppError::Conflict.status(), StatusCode::CONFLICT);
  }

  #[test]
  fn server_errors_map_to_500() {
    assert_eq!(
      AppError::Internal("boom".into()).status(),
      StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(
      AppError::Config("missing var".into()).status(),
      StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(
      AppError::Sqlx(sqlx::Error::RowNotFound).status(),
      StatusCode::INTERNAL_SERVER_ERROR
    );
  }

  #[test]
  fn insufficient_stock_names_the_product() {
    let err = AppError::InsufficientStock {
      product_id: Uuid::new_v4(),
      name: "Smart Watch".into(),
      available: 5,
      requested: 10,
    };
    assert!(err.to_string().contains("Smart Watch"));
    assert!(err.to_string().contains("5 available"));
  }
}
