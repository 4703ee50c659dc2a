use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::state::AppState;
use crate::web::handlers::{auth_handlers, cart_handlers, order_handlers, product_handlers};

async fn health_live_handler() -> HttpResponse {
  HttpResponse::Ok().json(json!({ "status": "ok" }))
}

async fn health_ready_handler(app_state: web::Data<AppState>) -> HttpResponse {
  match sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(&app_state.db_pool).await {
    Ok(_) => HttpResponse::Ok().json(json!({ "status": "ready", "database": "connected" })),
    Err(e) => {
      tracing::warn!(error = %e, "Readiness check failed: database unreachable.");
      HttpResponse::ServiceUnavailable().json(json!({ "status": "not ready", "database": "disconnected" }))
    }
  }
}

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg
    .service(
      web::scope("/health")
        .route("/live", web::get().to(health_live_handler))
        .route("/ready", web::get().to(health_ready_handler)),
    )
    .service(
      web::scope("/api")
        .service(
          web::scope("/auth")
            .route("/register", web::post().to(auth_handlers::register_handler))
            .route("/login", web::post().to(auth_handlers::login_handler))
            .route("/logout", web::post().to(auth_handlers::logout_handler))
            .route("/me", web::get().to(auth_handlers::me_handler)),
        )
        .service(
          web::scope("/products")
            .route("", web::get().to(product_handlers::list_products_handler))
            .route("/categories", web::get().to(product_handlers::get_categories_handler))
            .route(
              "/category/{category}",
              web::get().to(product_handlers::products_by_category_handler),
            )
            .route("/{product_id}", web::get().to(product_handlers::get_product_handler))
            .route("", web::post().to(product_handlers::create_product_handler))
            .route("/{product_id}", web::put().to(product_handlers::update_product_handler))
            .route("/{product_id}", web::delete().to(product_handlers::delete_product_handler)),
        )
        .service(
          web::scope("/cart")
            .route("", web::get().to(cart_handlers::get_cart_handler))
            .route("/items", web::post().to(cart_handlers::add_to_cart_handler))
            .route("/items/{cart_item_id}", web::put().to(cart_handlers::update_cart_item_handler))
            .route(
              "/items/{cart_item_id}",
              web::delete().to(cart_handlers::remove_from_cart_handler),
            )
            .route("", web::delete().to(cart_handlers::clear_cart_handler)),
        )
        .service(
          web::scope("/orders")
            // `/all` must register before `/{order_id}`; actix matches in order.
            .route("/all", web::get().to(order_handlers::list_all_orders_handler))
            .route("", web::get().to(order_handlers::list_orders_handler))
            .route("", web::post().to(order_handlers::create_order_handler))
            .route("/{order_id}", web::get().to(order_handlers::get_order_handler))
            .route(
              "/{order_id}/status",
              web::put().to(order_handlers::update_order_status_handler),
            ),
        ),
    );
}
