// cashbak/storefront/src/web/routes.rs

use crate::web::handlers::{cart_handlers, catalog_handlers, checkout_handlers, pricing_handlers, settlement_handlers};
use actix_web::web;

async fn health_check_handler() -> actix_web::HttpResponse {
  actix_web::HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/api/v1")
      .route("/health", web::get().to(health_check_handler))
      .route("/events", web::get().to(catalog_handlers::list_events_handler))
      .service(
        web::scope("/products")
          .route("", web::get().to(catalog_handlers::list_products_handler))
          .route("/{product_id}", web::get().to(catalog_handlers::get_product_handler)),
      )
      .route("/pricing/quote", web::get().to(pricing_handlers::quote_handler))
      .service(
        web::scope("/cart")
          .route("", web::get().to(cart_handlers::view_cart_handler))
          .route("/items", web::post().to(cart_handlers::add_to_cart_handler)),
      )
      .service(
        web::scope("/checkout")
          .route("", web::post().to(checkout_handlers::start_checkout_handler))
          .route("/commit", web::post().to(checkout_handlers::commit_checkout_handler)),
      )
      .route(
        "/admin/events/{event_id}/resolve",
        web::post().to(settlement_handlers::resolve_event_handler),
      )
      .route(
        "/orders/{order_id}/payouts",
        web::get().to(settlement_handlers::order_payouts_handler),
      ),
  );
}
