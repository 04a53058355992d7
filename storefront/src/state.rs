// cashbak/storefront/src/state.rs
use crate::config::AppConfig;
use crate::pipelines::AddToCartFlow;
use crate::services::MockWebpay;
use cashbak::{CheckoutFlow, Clock, InMemoryCatalog, PricingConfig, PricingEngine};
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
  pub db_pool: PgPool,
  pub config: Arc<AppConfig>,
  pub pricing: Arc<PricingConfig>,
  pub clock: Arc<dyn Clock>,
  pub payments: Arc<MockWebpay>,
  pub add_to_cart: Arc<AddToCartFlow>,
  pub checkout: Arc<CheckoutFlow>,
}

impl AppState {
  /// A pricing engine over `catalog` with this app's settings and clock.
  pub fn engine<'a>(&'a self, catalog: &'a InMemoryCatalog) -> PricingEngine<'a> {
    PricingEngine::new(&self.pricing, catalog, catalog, self.clock.as_ref())
  }
}
