// cashbak/storefront/src/web/handlers/settlement_handlers.rs

use actix_web::{web, HttpResponse};
use cashbak::{order_payouts, Clock, InMemoryCatalog};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::db;
use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

#[derive(Deserialize, Debug)]
pub struct ResolveEventPayload {
  pub won: bool,
}

#[instrument(name = "handler::resolve_event", skip(app_state, path, payload), fields(event_id = %path.as_ref()))]
pub async fn resolve_event_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
  payload: web::Json<ResolveEventPayload>,
) -> Result<HttpResponse, AppError> {
  let event_id = path.into_inner();
  let (zone, now) = (app_state.pricing.reference_zone, app_state.clock.now_utc());
  let event = db::catalog::resolve_event(&app_state.db_pool, event_id, payload.won, zone, now).await?;
  info!(event_id, outcome = ?event.outcome, "Event resolved.");

  Ok(HttpResponse::Ok().json(json!({ "event": event })))
}

/// Cashback owed per item of one of the caller's orders.
#[instrument(name = "handler::order_payouts", skip(app_state, path, auth_user), fields(order_id = %path.as_ref(), user_id = %auth_user.user_id))]
pub async fn order_payouts_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let order_id = path.into_inner();
  let order = db::orders::find_order(&app_state.db_pool, order_id)
    .await?
    .filter(|order| order.user_id == auth_user.user_id)
    .ok_or_else(|| {
      warn!("Order not found for caller.");
      AppError::NotFound(format!("Order {} not found.", order_id))
    })?;

  let items = db::orders::order_items(&app_state.db_pool, order.id).await?;
  let events = InMemoryCatalog::new(db::catalog::load_events(&app_state.db_pool).await?, Vec::new());
  let payouts = order_payouts(order.id, &items, &events);

  Ok(HttpResponse::Ok().json(json!({
    "order": order,
    "payouts": payouts,
  })))
}
