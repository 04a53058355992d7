// cashbak/storefront/src/web/handlers/cart_handlers.rs

use actix_web::{web, HttpResponse};
use cashbak::{cart_total, CartLineItem, FlowContext, FlowOutcome};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::db;
use crate::errors::AppError;
use crate::pipelines::AddToCartCtxData;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

#[derive(Deserialize, Debug)]
pub struct AddToCartRequestPayload {
  pub product_id: i64,
  pub size: String,
  pub quantity: i32,
  pub event_id: i64,
  #[serde(default)]
  pub print: bool,
}

#[instrument(name = "handler::view_cart", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn view_cart_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let rows = db::cart::list_cart_rows(&app_state.db_pool, auth_user.user_id).await?;
  let lines = rows
    .iter()
    .cloned()
    .map(CartLineItem::try_from)
    .collect::<Result<Vec<_>, _>>()?;

  Ok(HttpResponse::Ok().json(json!({
    "items": rows,
    "total": cart_total(&lines),
    "projectedCashback": lines.iter().map(CartLineItem::projected_payout).sum::<i64>(),
    "currency": app_state.config.currency,
  })))
}

#[instrument(
  name = "handler::add_to_cart",
  skip(app_state, req_payload, auth_user),
  fields(user_id = %auth_user.user_id, product_id = req_payload.product_id, event_id = req_payload.event_id)
)]
pub async fn add_to_cart_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<AddToCartRequestPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.into_inner();
  let ctx = FlowContext::new(AddToCartCtxData::new(
    app_state.get_ref().clone(),
    auth_user.user_id,
    payload.product_id,
    payload.size,
    payload.quantity,
    payload.event_id,
    payload.print,
  ));

  match app_state.add_to_cart.run(ctx.clone()).await? {
    FlowOutcome::Completed => {
      let cart_item = ctx.read().cart_item.clone().ok_or_else(|| {
        warn!("Add to Cart pipeline completed but cart_item was not set.");
        AppError::Internal("Cart update completed, but item details are unavailable.".to_string())
      })?;
      info!(cart_item_id = %cart_item.id, percent = cart_item.cashback_percent, "Item added to cart.");
      Ok(HttpResponse::Created().json(json!({
        "message": "Item added to cart successfully.",
        "cartItem": cart_item,
      })))
    }
    FlowOutcome::Stopped => {
      warn!("Add to Cart pipeline was stopped by a handler.");
      Err(AppError::PipelineHaltedByHandler)
    }
  }
}
