//! Request extractors for authenticated and administrative callers.

use actix_web::{http::header, web, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::errors::AppError;
use crate::models::User;
use crate::services::token_service;
use crate::state::AppState;

/// Resolved from a `Authorization: Bearer <token>` header. The token's
/// subject is re-fetched so a deleted user cannot keep acting on a live
/// token.
#[derive(Debug)]
pub struct AuthenticatedUser {
  pub user: User,
}

impl AuthenticatedUser {
  pub fn user_id(&self) -> uuid::Uuid {
    self.user.id
  }
}

async fn resolve_user(req: HttpRequest) -> Result<AuthenticatedUser, AppError> {
  let state = req
    .app_data::<web::Data<AppState>>()
    .cloned()
    .ok_or_else(|| AppError::Internal("Application state is not configured".to_string()))?;

  let header_value = req
    .headers()
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or_else(|| AppError::Auth("Authentication required".to_string()))?;

  let token = header_value
    .strip_prefix("Bearer ")
    .ok_or_else(|| AppError::Auth("Authorization header must use the Bearer scheme".to_string()))?;

  let claims = token_service::decode_token(token, &state.config.jwt_secret)?;

  let user: Option<User> = sqlx::query_as(
    "SELECT id, email, password_hash, first_name, last_name, is_admin, created_at, updated_at \
     FROM users WHERE id = $1",
  )
  .bind(claims.sub)
  .fetch_optional(&state.db_pool)
  .await?;

  let user = user.ok_or_else(|| {
    warn!(user_id = %claims.sub, "Token subject no longer exists.");
    AppError::Auth("User not found".to_string())
  })?;

  Ok(AuthenticatedUser { user })
}

impl FromRequest for AuthenticatedUser {
  type Error = AppError;
  type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
    let req = req.clone();
    Box::pin(resolve_user(req))
  }
}

/// Same as [`AuthenticatedUser`], additionally requiring the `is_admin` flag.
#[derive(Debug)]
pub struct AdminUser {
  pub user: User,
}

impl FromRequest for AdminUser {
  type Error = AppError;
  type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
    let req = req.clone();
    Box::pin(async move {
      let authed = resolve_user(req).await?;
      if !authed.user.is_admin {
        return Err(AppError::Forbidden("Admin access required".to_string()));
      }
      Ok(AdminUser { user: authed.user })
    })
  }
}
