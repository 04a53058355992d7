// cashbak/storefront/src/main.rs

mod config;
mod db;
mod errors;
mod models;
mod pipelines;
mod services;
mod state;
mod web;

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::services::MockWebpay;
use crate::state::AppState;

use actix_web::{web as actix_data, App, HttpServer};
use cashbak::{Clock, SystemClock};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

fn startup_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
  tracing::error!(error = %err, "{}", context);
  std::io::Error::new(std::io::ErrorKind::Other, format!("{context}: {err}"))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  tracing_subscriber::fmt()
    .with_max_level(Level::INFO)
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env()) // RUST_LOG override
    .with_span_events(FmtSpan::CLOSE)
    .init();

  tracing::info!("Starting CashBak storefront...");

  let app_config = Arc::new(AppConfig::from_env().map_err(|e| startup_error("Failed to load configuration", e))?);
  let pricing = Arc::new(
    app_config
      .pricing_config()
      .map_err(|e| startup_error("Invalid pricing configuration", e))?,
  );
  tracing::info!(
    margin_rate = pricing.margin_rate,
    zone = %pricing.reference_zone,
    "Pricing configuration ready."
  );

  let db_pool = PgPool::connect(&app_config.database_url)
    .await
    .map_err(|e| startup_error("Failed to connect to the database", e))?;
  tracing::info!("Successfully connected to the database.");

  sqlx::migrate!("./migrations")
    .run(&db_pool)
    .await
    .map_err(|e| startup_error("Failed to run migrations", e))?;

  let clock: Arc<dyn Clock> = Arc::new(SystemClock);
  if app_config.seed_db {
    let now = clock.now_in(pricing.reference_zone);
    if let Err(e) = db::seed::seed_db(&db_pool, now).await {
      tracing::error!(error = %e, "Failed to seed database.");
    }
  }

  let payments = Arc::new(MockWebpay::new(
    app_config.app_base_url.clone(),
    app_config.mock_webpay_commerce_code.clone(),
    Duration::from_millis(app_config.mock_webpay_latency_ms),
  ));

  let build_flows = || -> Result<_, AppError> {
    let add_to_cart = pipelines::build_add_to_cart_pipeline()?;
    let checkout = pipelines::build_checkout_pipeline(db_pool.clone(), payments.clone(), &app_config)?;
    Ok((add_to_cart, checkout))
  };
  let (add_to_cart, checkout) = build_flows().map_err(|e| startup_error("Failed to build flows", e))?;
  tracing::info!("Storefront flows built.");

  let app_state = AppState {
    db_pool,
    config: app_config.clone(),
    pricing,
    clock,
    payments,
    add_to_cart: Arc::new(add_to_cart),
    checkout: Arc::new(checkout),
  };

  let server_address = format!("{}:{}", app_config.server_host, app_config.server_port);
  tracing::info!("Attempting to bind server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(web::configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await
}
