// cashbak/storefront/src/web/handlers/catalog_handlers.rs

use actix_web::{web, HttpResponse};
use cashbak::{Event, PricingEngine, Product};
use serde::Serialize;
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::db;
use crate::errors::AppError;
use crate::state::AppState;

/// A product as listed in the store, with its "cashback up to X%" figure.
#[derive(Debug, Serialize)]
pub struct ProductView<'a> {
  #[serde(flatten)]
  pub product: &'a Product,
  pub max_cashback_percent: u8,
}

impl<'a> ProductView<'a> {
  fn new(product: &'a Product, engine: &PricingEngine<'_>) -> Self {
    Self {
      product,
      max_cashback_percent: engine.max_cashback_for_category(product.category),
    }
  }
}

#[instrument(name = "handler::list_events", skip(app_state))]
pub async fn list_events_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let catalog = db::catalog::load_catalog(&app_state.db_pool).await?;
  let engine = app_state.engine(&catalog);
  let events: Vec<&Event> = engine.valid_events();
  info!(open_events = events.len(), "Listing open events.");

  Ok(HttpResponse::Ok().json(json!({ "events": events })))
}

#[instrument(name = "handler::list_products", skip(app_state))]
pub async fn list_products_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let catalog = db::catalog::load_catalog(&app_state.db_pool).await?;
  let engine = app_state.engine(&catalog);
  let products: Vec<ProductView<'_>> = catalog
    .products()
    .iter()
    .map(|product| ProductView::new(product, &engine))
    .collect();
  info!(count = products.len(), "Listing products.");

  Ok(HttpResponse::Ok().json(json!({ "products": products })))
}

#[instrument(name = "handler::get_product", skip(app_state, path), fields(product_id = %path.as_ref()))]
pub async fn get_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();
  let catalog = db::catalog::load_catalog(&app_state.db_pool).await?;
  let Some(product) = catalog.find_product(product_id) else {
    warn!(product_id, "Product not found.");
    return Err(AppError::NotFound(format!("Product with ID {} not found.", product_id)));
  };
  let engine = app_state.engine(&catalog);

  Ok(HttpResponse::Ok().json(json!({ "product": ProductView::new(product, &engine) })))
}
