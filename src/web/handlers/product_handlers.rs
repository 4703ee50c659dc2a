use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::errors::AppError;
use crate::services::product_service::{self, NewProduct, ProductChanges};
use crate::state::AppState;
use crate::web::extractors::AdminUser;
use crate::web::handlers::validate_payload;

const DEFAULT_PAGE_LIMIT: i64 = 20;

#[derive(Debug, Deserialize)]
pub struct ListProductsQuery {
  pub page: Option<i64>,
  pub limit: Option<i64>,
  pub category: Option<String>,
  pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
  pub page: Option<i64>,
  pub limit: Option<i64>,
}

pub(crate) fn page_params(page: Option<i64>, limit: Option<i64>) -> (i64, i64) {
  (page.unwrap_or(1).max(1), limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, 100))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductRequest {
  #[validate(length(min = 1, max = 255, message = "must be 1 to 255 characters"))]
  pub name: String,
  pub description: Option<String>,
  #[validate(range(min = 0, message = "must not be negative"))]
  pub price_cents: i32,
  #[validate(range(min = 0, message = "must not be negative"))]
  pub stock_quantity: i32,
  #[validate(length(max = 100, message = "must be at most 100 characters"))]
  pub category: Option<String>,
  #[validate(url(message = "must be a valid URL"))]
  pub image_url: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProductRequest {
  #[validate(length(min = 1, max = 255, message = "must be 1 to 255 characters"))]
  pub name: Option<String>,
  pub description: Option<String>,
  #[validate(range(min = 0, message = "must not be negative"))]
  pub price_cents: Option<i32>,
  #[validate(range(min = 0, message = "must not be negative"))]
  pub stock_quantity: Option<i32>,
  #[validate(length(max = 100, message = "must be at most 100 characters"))]
  pub category: Option<String>,
  #[validate(url(message = "must be a valid URL"))]
  pub image_url: Option<String>,
}

#[instrument(name = "handler::list_products", skip(app_state, query))]
pub async fn list_products_handler(
  app_state: web::Data<AppState>,
  query: web::Query<ListProductsQuery>,
) -> Result<HttpResponse, AppError> {
  let query = query.into_inner();
  let (page, limit) = page_params(query.page, query.limit);
  let (products, pagination) = product_service::list(&app_state.db_pool, page, limit, query.category, query.search).await?;
  Ok(HttpResponse::Ok().json(json!({ "products": products, "pagination": pagination })))
}

#[instrument(name = "handler::get_product", skip(app_state))]
pub async fn get_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let product = product_service::get(&app_state.db_pool, path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({ "product": product })))
}

#[instrument(name = "handler::get_categories", skip(app_state))]
pub async fn get_categories_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let categories = product_service::categories(&app_state.db_pool).await?;
  Ok(HttpResponse::Ok().json(json!({ "categories": categories })))
}

#[instrument(name = "handler::products_by_category", skip(app_state, query))]
pub async fn products_by_category_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
  query: web::Query<PageQuery>,
) -> Result<HttpResponse, AppError> {
  let (page, limit) = page_params(query.page, query.limit);
  let (products, pagination) =
    product_service::list(&app_state.db_pool, page, limit, Some(path.into_inner()), None).await?;
  Ok(HttpResponse::Ok().json(json!({ "products": products, "pagination": pagination })))
}

#[instrument(name = "handler::create_product", skip(app_state, payload, _admin))]
pub async fn create_product_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<CreateProductRequest>,
  _admin: AdminUser,
) -> Result<HttpResponse, AppError> {
  validate_payload(&*payload)?;
  let payload = payload.into_inner();
  let product = product_service::create(
    &app_state.db_pool,
    NewProduct {
      name: payload.name,
      description: payload.description,
      price_cents: payload.price_cents,
      stock_quantity: payload.stock_quantity,
      category: payload.category,
      image_url: payload.image_url,
    },
  )
  .await?;
  Ok(HttpResponse::Created().json(json!({ "product": product })))
}

#[instrument(name = "handler::update_product", skip(app_state, payload, _admin))]
pub async fn update_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  payload: web::Json<UpdateProductRequest>,
  _admin: AdminUser,
) -> Result<HttpResponse, AppError> {
  validate_payload(&*payload)?;
  let payload = payload.into_inner();
  let product = product_service::update(
    &app_state.db_pool,
    path.into_inner(),
    ProductChanges {
      name: payload.name,
      description: payload.description,
      price_cents: payload.price_cents,
      stock_quantity: payload.stock_quantity,
      category: payload.category,
      image_url: payload.image_url,
    },
  )
  .await?;
  Ok(HttpResponse::Ok().json(json!({ "product": product })))
}

#[instrument(name = "handler::delete_product", skip(app_state, _admin))]
pub async fn delete_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  _admin: AdminUser,
) -> Result<HttpResponse, AppError> {
  product_service::delete(&app_state.db_pool, path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({ "message": "Product deleted successfully" })))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn page_params_apply_defaults_and_bounds() {
    assert_eq!(page_params(None, None), (1, 20));
    assert_eq!(page_params(Some(0), Some(500)), (1, 100));
    assert_eq!(page_params(Some(3), Some(10)), (3, 10));
    assert_eq!(page_params(Some(-2), Some(0)), (1, 1));
  }
}
