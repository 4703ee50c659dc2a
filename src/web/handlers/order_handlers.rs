use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::errors::AppError;
use crate::models::OrderStatus;
use crate::services::order_service;
use crate::state::AppState;
use crate::web::extractors::{AdminUser, AuthenticatedUser};
use crate::web::handlers::product_handlers::page_params;
use crate::web::handlers::validate_payload;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderRequest {
  #[validate(length(min = 1, message = "must not be empty"))]
  pub shipping_address: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrderStatusRequest {
  pub status: OrderStatus,
}

#[derive(Debug, Deserialize)]
pub struct AllOrdersQuery {
  pub page: Option<i64>,
  pub limit: Option<i64>,
  pub status: Option<OrderStatus>,
}

#[instrument(name = "handler::create_order", skip(app_state, payload, auth_user), fields(user_id = %auth_user.user_id()))]
pub async fn create_order_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<CreateOrderRequest>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  validate_payload(&*payload)?;
  let order = order_service::place_order(&app_state.db_pool, auth_user.user_id(), &payload.shipping_address).await?;
  Ok(HttpResponse::Created().json(json!({ "order": order })))
}

#[instrument(name = "handler::list_orders", skip(app_state, auth_user), fields(user_id = %auth_user.user_id()))]
pub async fn list_orders_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let orders = order_service::list_orders(&app_state.db_pool, auth_user.user_id()).await?;
  Ok(HttpResponse::Ok().json(json!({ "orders": orders })))
}

#[instrument(name = "handler::get_order", skip(app_state, auth_user), fields(user_id = %auth_user.user_id()))]
pub async fn get_order_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let order = order_service::get_order(&app_state.db_pool, auth_user.user_id(), path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({ "order": order })))
}

#[instrument(name = "handler::list_all_orders", skip(app_state, query, _admin))]
pub async fn list_all_orders_handler(
  app_state: web::Data<AppState>,
  query: web::Query<AllOrdersQuery>,
  _admin: AdminUser,
) -> Result<HttpResponse, AppError> {
  let query = query.into_inner();
  let (page, limit) = page_params(query.page, query.limit);
  let (orders, pagination) = order_service::list_all_orders(&app_state.db_pool, page, limit, query.status).await?;
  Ok(HttpResponse::Ok().json(json!({ "orders": orders, "pagination": pagination })))
}

#[instrument(name = "handler::update_order_status", skip(app_state, payload, _admin))]
pub async fn update_order_status_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  payload: web::Json<UpdateOrderStatusRequest>,
  _admin: AdminUser,
) -> Result<HttpResponse, AppError> {
  let order = order_service::update_status(&app_state.db_pool, path.into_inner(), payload.status).await?;
  Ok(HttpResponse::Ok().json(json!({ "order": order })))
}
