use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::errors::AppError;
use crate::models::User;
use crate::services::{auth_service, token_service};
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;
use crate::web::handlers::validate_payload;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
  #[validate(email(message = "must be a valid email address"))]
  pub email: String,
  #[validate(length(min = 6, message = "must be at least 6 characters"))]
  pub password: String,
  #[validate(length(min = 2, max = 100, message = "must be 2 to 100 characters"))]
  pub first_name: Option<String>,
  #[validate(length(min = 2, max = 100, message = "must be 2 to 100 characters"))]
  pub last_name: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
  #[validate(email(message = "must be a valid email address"))]
  pub email: String,
  #[validate(length(min = 1, message = "must not be empty"))]
  pub password: String,
}

#[instrument(name = "handler::register", skip(app_state, payload))]
pub async fn register_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
  validate_payload(&*payload)?;

  let existing: Option<uuid::Uuid> = sqlx::query_scalar("SELECT id FROM users WHERE email = $1")
    .bind(&payload.email)
    .fetch_optional(&app_state.db_pool)
    .await?;
  if existing.is_some() {
    return Err(AppError::Validation("Email already registered".to_string()));
  }

  let password_hash = auth_service::hash_password(&payload.password)?;

  let user: User = sqlx::query_as(
    "INSERT INTO users (email, password_hash, first_name, last_name) \
     VALUES ($1, $2, $3, $4) \
     RETURNING id, email, password_hash, first_name, last_name, is_admin, created_at, updated_at",
  )
  .bind(&payload.email)
  .bind(&password_hash)
  .bind(&payload.first_name)
  .bind(&payload.last_name)
  .fetch_one(&app_state.db_pool)
  .await?;

  let token = token_service::issue_token(user.id, &app_state.config.jwt_secret, app_state.config.jwt_expiry_hours)?;

  info!(user_id = %user.id, "User registered.");
  Ok(HttpResponse::Created().json(json!({ "user": user, "token": token })))
}

#[instrument(name = "handler::login", skip(app_state, payload))]
pub async fn login_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
  validate_payload(&*payload)?;

  let user: Option<User> = sqlx::query_as(
    "SELECT id, email, password_hash, first_name, last_name, is_admin, created_at, updated_at \
     FROM users WHERE email = $1",
  )
  .bind(&payload.email)
  .fetch_optional(&app_state.db_pool)
  .await?;

  let user = match user {
    Some(u) => u,
    None => {
      warn!("Login attempt for unknown email.");
      return Err(AppError::Auth("Invalid credentials".to_string()));
    }
  };

  if !auth_service::verify_password(&user.password_hash, &payload.password)? {
    warn!(user_id = %user.id, "Login attempt with wrong password.");
    return Err(AppError::Auth("Invalid credentials".to_string()));
  }

  let token = token_service::issue_token(user.id, &app_state.config.jwt_secret, app_state.config.jwt_expiry_hours)?;

  info!(user_id = %user.id, "User logged in.");
  Ok(HttpResponse::Ok().json(json!({ "user": user, "token": token })))
}

// Tokens are stateless, so logout is an acknowledgement; clients drop the
// token.
#[instrument(name = "handler::logout", skip_all, fields(user_id = %auth_user.user_id()))]
pub async fn logout_handler(auth_user: AuthenticatedUser) -> Result<HttpResponse, AppError> {
  Ok(HttpResponse::Ok().json(json!({ "message": "Logged out successfully" })))
}

#[instrument(name = "handler::me", skip_all, fields(user_id = %auth_user.user_id()))]
pub async fn me_handler(auth_user: AuthenticatedUser) -> Result<HttpResponse, AppError> {
  Ok(HttpResponse::Ok().json(json!({ "user": auth_user.user })))
}
