// cashbak/storefront/src/web/handlers/checkout_handlers.rs

use actix_web::{web, HttpResponse};
use cashbak::{cart_total, run_checkout, CheckoutState, FlowOutcome, OrderStatus, PaymentGateway, PaymentRequest};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::db;
use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

#[derive(Deserialize, Debug)]
pub struct StartCheckoutPayload {
  pub buyer_email: String,
}

#[derive(Deserialize, Debug)]
pub struct CommitPayload {
  pub token_ws: String,
}

/// Opens a gateway transaction for the current cart total and remembers which
/// buyer the returned token belongs to.
#[instrument(name = "handler::start_checkout", skip(app_state, auth_user, payload), fields(user_id = %auth_user.user_id))]
pub async fn start_checkout_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  payload: web::Json<StartCheckoutPayload>,
) -> Result<HttpResponse, AppError> {
  let buyer_email = payload.into_inner().buyer_email.trim().to_string();
  if !buyer_email.contains('@') {
    return Err(AppError::Validation("A valid buyer email is required.".to_string()));
  }

  let lines = db::cart::list_cart(&app_state.db_pool, auth_user.user_id).await?;
  if lines.is_empty() {
    return Err(AppError::Validation("Cart is empty.".to_string()));
  }
  let amount = cart_total(&lines);

  let request = PaymentRequest {
    buy_order: Uuid::new_v4().simple().to_string(),
    session_id: auth_user.user_id.to_string(),
    amount,
    return_url: format!("{}/api/v1/checkout/commit", app_state.config.app_base_url.trim_end_matches('/')),
  };
  let redirect = app_state
    .payments
    .create(&request)
    .await
    .map_err(|e| AppError::Payment(format!("Could not start payment: {e}")))?;

  db::cart::save_checkout_session(&app_state.db_pool, &redirect.token, auth_user.user_id, &buyer_email, amount)
    .await?;
  info!(amount, buy_order = %request.buy_order, "Checkout transaction created.");

  Ok(HttpResponse::Ok().json(json!({
    "token": redirect.token,
    "url": redirect.url,
    "amount": amount,
    "currency": app_state.config.currency,
  })))
}

/// Return leg from the gateway: commits the token and runs the checkout flow
/// for the buyer who opened it.
#[instrument(name = "handler::commit_checkout", skip(app_state, payload))]
pub async fn commit_checkout_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<CommitPayload>,
) -> Result<HttpResponse, AppError> {
  let token = payload.into_inner().token_ws;
  let session = db::cart::take_checkout_session(&app_state.db_pool, &token)
    .await?
    .ok_or_else(|| AppError::NotFound("Unknown or already used checkout token.".to_string()))?;

  let lines = db::cart::list_cart(&app_state.db_pool, session.user_id).await?;
  let state = CheckoutState::new(
    session.user_id,
    session.buyer_email,
    app_state.config.currency.clone(),
    session.token,
    lines,
  );

  let report = run_checkout(&app_state.checkout, state).await?;
  let order = report
    .state
    .order
    .as_ref()
    .ok_or_else(|| AppError::Internal("Checkout finished without an order.".to_string()))?;

  match report.outcome {
    FlowOutcome::Completed if order.status == OrderStatus::Paid => {
      info!(order_id = %order.id, total = order.total_amount, "Checkout completed.");
      Ok(HttpResponse::Ok().json(json!({
        "message": "Checkout successful.",
        "orderId": order.id,
        "status": order.status,
        "totalAmount": order.total_amount,
        "authorizationCode": order.authorization_code,
        "confirmationEmailSent": report.state.confirmation_sent(),
        "items": order.items,
      })))
    }
    _ => {
      let reason = report
        .state
        .failure_reason
        .clone()
        .unwrap_or_else(|| "Payment was not completed.".to_string());
      warn!(order_id = %order.id, %reason, "Checkout stopped.");
      Err(AppError::Payment(reason))
    }
  }
}
