use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::errors::AppError;
use crate::services::cart_service;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;
use crate::web::handlers::validate_payload;

#[derive(Debug, Deserialize, Validate)]
pub struct AddCartItemRequest {
  pub product_id: Uuid,
  #[validate(range(min = 1, message = "must be at least 1"))]
  pub quantity: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCartItemRequest {
  #[validate(range(min = 1, message = "must be at least 1"))]
  pub quantity: i32,
}

#[instrument(name = "handler::get_cart", skip(app_state, auth_user), fields(user_id = %auth_user.user_id()))]
pub async fn get_cart_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let cart = cart_service::get_cart(&app_state.db_pool, auth_user.user_id()).await?;
  Ok(HttpResponse::Ok().json(cart))
}

#[instrument(
  name = "handler::add_to_cart",
  skip(app_state, payload, auth_user),
  fields(user_id = %auth_user.user_id(), product_id = %payload.product_id, quantity = %payload.quantity)
)]
pub async fn add_to_cart_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<AddCartItemRequest>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  validate_payload(&*payload)?;
  let item = cart_service::add_item(
    &app_state.db_pool,
    auth_user.user_id(),
    payload.product_id,
    payload.quantity,
  )
  .await?;
  Ok(HttpResponse::Created().json(json!({ "item": item })))
}

#[instrument(
  name = "handler::update_cart_item",
  skip(app_state, payload, auth_user),
  fields(user_id = %auth_user.user_id(), quantity = %payload.quantity)
)]
pub async fn update_cart_item_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  payload: web::Json<UpdateCartItemRequest>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  validate_payload(&*payload)?;
  let item = cart_service::update_item(
    &app_state.db_pool,
    auth_user.user_id(),
    path.into_inner(),
    payload.quantity,
  )
  .await?;
  Ok(HttpResponse::Ok().json(json!({ "item": item })))
}

#[instrument(name = "handler::remove_from_cart", skip(app_state, auth_user), fields(user_id = %auth_user.user_id()))]
pub async fn remove_from_cart_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  cart_service::remove_item(&app_state.db_pool, auth_user.user_id(), path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({ "message": "Item removed from cart" })))
}

#[instrument(name = "handler::clear_cart", skip(app_state, auth_user), fields(user_id = %auth_user.user_id()))]
pub async fn clear_cart_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  cart_service::clear(&app_state.db_pool, auth_user.user_id()).await?;
  Ok(HttpResponse::Ok().json(json!({ "message": "Cart cleared successfully" })))
}
