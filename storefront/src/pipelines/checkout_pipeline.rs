// cashbak/storefront/src/pipelines/checkout_pipeline.rs

use crate::config::AppConfig;
use crate::db::{self, PgOrderStore, PgStockLedger};
use crate::services::MockEmailNotifier;
use cashbak::checkout::DECREMENT_STOCK;
use cashbak::{
  build_checkout_flow, CheckoutError, CheckoutFlow, CheckoutServices, CheckoutState, FlowError, FlowContext,
  PaymentGateway, StepControl,
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{info, warn};

/// Checkout against Postgres, `payments` and the mock mailer. Once stock is
/// decremented the buyer's cart is emptied.
pub fn build_checkout_pipeline(
  db_pool: PgPool,
  payments: Arc<dyn PaymentGateway>,
  config: &AppConfig,
) -> Result<CheckoutFlow, FlowError> {
  let mut flow = build_checkout_flow(CheckoutServices {
    orders: Arc::new(PgOrderStore::new(db_pool.clone())),
    payments,
    stock: Arc::new(PgStockLedger::new(db_pool.clone())),
    notifier: Arc::new(MockEmailNotifier::new(config.mock_email_sender.clone())),
  })?;

  flow.after(DECREMENT_STOCK, move |ctx: FlowContext<CheckoutState>| {
    let db_pool = db_pool.clone();
    async move {
      let user_id = ctx.read().user_id;
      // The order is already paid and stocked; a leftover cart is not worth failing it over.
      match db::cart::clear_cart(&db_pool, user_id).await {
        Ok(removed) => info!(%user_id, removed, "Cart cleared after checkout."),
        Err(e) => warn!(%user_id, error = %e, "Could not clear cart after checkout."),
      }
      Ok::<_, CheckoutError>(StepControl::Continue)
    }
  })?;

  Ok(flow)
}
