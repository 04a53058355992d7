// cashbak/src/checkout/flow.rs

//! The checkout sequence: create order → confirm payment → decrement stock →
//! send confirmation. Built on `Flow` so every step gets its own span and the
//! same stop/error semantics.

use crate::checkout::collaborators::{Notifier, OrderStore, PaymentGateway};
use crate::checkout::state::CheckoutState;
use crate::error::{CheckoutError, FlowError};
use crate::flow::{Flow, FlowContext, FlowOutcome, StepControl};
use crate::inventory::{StockLedger, StockRequest};
use crate::model::{Order, OrderStatus};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

pub const CREATE_ORDER: &str = "create_order";
pub const CONFIRM_PAYMENT: &str = "confirm_payment";
pub const DECREMENT_STOCK: &str = "decrement_stock";
pub const SEND_CONFIRMATION: &str = "send_confirmation";

pub type CheckoutFlow = Flow<CheckoutState, CheckoutError>;

/// The collaborators one checkout flow is wired to.
#[derive(Clone)]
pub struct CheckoutServices {
  pub orders: Arc<dyn OrderStore>,
  pub payments: Arc<dyn PaymentGateway>,
  pub stock: Arc<dyn StockLedger>,
  pub notifier: Arc<dyn Notifier>,
}

#[derive(Debug, Clone)]
pub struct CheckoutReport {
  pub outcome: FlowOutcome,
  pub state: CheckoutState,
}

fn collaborator(name: &'static str) -> impl FnOnce(anyhow::Error) -> CheckoutError {
  move |source| CheckoutError::Collaborator {
    collaborator: name,
    source,
  }
}

/// Marks the order failed in the store and in the shared state. A store
/// failure here is logged; the original cause is what the caller reports.
async fn fail_order(orders: &dyn OrderStore, ctx: &FlowContext<CheckoutState>, order_id: Uuid, reason: &str) {
  if let Err(e) = orders.mark_failed(order_id, reason).await {
    error!(%order_id, error = %e, "Could not mark order as failed.");
  }
  let mut guard = ctx.write();
  if let Some(order) = guard.order.as_mut() {
    order.status = OrderStatus::Failed;
  }
  guard.failure_reason = Some(reason.to_string());
}

pub fn build_checkout_flow(services: CheckoutServices) -> Result<CheckoutFlow, FlowError> {
  let mut flow = CheckoutFlow::new(
    "checkout",
    &[
      (CREATE_ORDER, false),
      (CONFIRM_PAYMENT, false),
      (DECREMENT_STOCK, false),
      (SEND_CONFIRMATION, true),
    ],
  );

  let orders = services.orders.clone();
  flow.on(CREATE_ORDER, move |ctx: FlowContext<CheckoutState>| {
    let orders = orders.clone();
    async move {
      let order = {
        let guard = ctx.read();
        if guard.lines.is_empty() {
          return Err(CheckoutError::EmptyCart);
        }
        Order::snapshot(
          guard.user_id,
          guard.buyer_email.clone(),
          guard.currency.clone(),
          guard.payment_token.clone(),
          &guard.lines,
        )
      };

      info!(
        order_id = %order.id,
        total = order.total_amount,
        items = order.items.len(),
        "Creating order record."
      );
      orders.create_order(&order).await.map_err(collaborator("order_store"))?;
      ctx.write().order = Some(order);
      Ok(StepControl::Continue)
    }
  })?;

  let orders = services.orders.clone();
  let payments = services.payments.clone();
  flow.on(CONFIRM_PAYMENT, move |ctx: FlowContext<CheckoutState>| {
    let orders = orders.clone();
    let payments = payments.clone();
    async move {
      let (order_id, total, token) = {
        let guard = ctx.read();
        let order = guard
          .order
          .as_ref()
          .ok_or_else(|| CheckoutError::missing(CONFIRM_PAYMENT, "order"))?;
        (order.id, order.total_amount, guard.payment_token.clone())
      };

      let confirmation = match payments.commit(&token).await {
        Ok(confirmation) => confirmation,
        Err(source) => {
          fail_order(orders.as_ref(), &ctx, order_id, "payment commit failed").await;
          return Err(collaborator("payment_gateway")(source));
        }
      };

      let rejection = if !confirmation.authorized {
        Some(format!(
          "payment not authorized (response code {})",
          confirmation.response_code
        ))
      } else if confirmation.amount != total {
        Some(format!(
          "committed amount {} does not match order total {}",
          confirmation.amount, total
        ))
      } else {
        None
      };

      if let Some(reason) = rejection {
        warn!(%order_id, %reason, "Payment rejected; stopping checkout.");
        ctx.write().payment = Some(confirmation);
        fail_order(orders.as_ref(), &ctx, order_id, &reason).await;
        return Ok(StepControl::Stop);
      }

      orders
        .mark_paid(order_id, confirmation.authorization_code.as_deref())
        .await
        .map_err(collaborator("order_store"))?;
      {
        let mut guard = ctx.write();
        if let Some(order) = guard.order.as_mut() {
          order.status = OrderStatus::Paid;
          order.authorization_code = confirmation.authorization_code.clone();
        }
        guard.payment = Some(confirmation);
      }
      info!(%order_id, "Payment confirmed.");
      Ok(StepControl::Continue)
    }
  })?;

  let orders = services.orders.clone();
  let stock = services.stock.clone();
  flow.on(DECREMENT_STOCK, move |ctx: FlowContext<CheckoutState>| {
    let orders = orders.clone();
    let stock = stock.clone();
    async move {
      let (order_id, requests) = {
        let guard = ctx.read();
        let order = guard
          .order
          .as_ref()
          .ok_or_else(|| CheckoutError::missing(DECREMENT_STOCK, "order"))?;
        let requests: Vec<StockRequest> = guard.lines.iter().map(StockRequest::from).collect();
        (order.id, requests)
      };

      match stock.reserve(&requests).await {
        Ok(()) => {
          ctx.write().stock_reserved = true;
          info!(%order_id, lines = requests.len(), "Stock decremented.");
          Ok(StepControl::Continue)
        }
        Err(source) => {
          warn!(%order_id, error = %source, "Stock reservation rejected.");
          fail_order(orders.as_ref(), &ctx, order_id, &source.to_string()).await;
          Err(CheckoutError::Stock { order_id, source })
        }
      }
    }
  })?;

  flow.set_skip_condition(SEND_CONFIRMATION, |ctx: FlowContext<CheckoutState>| {
    let guard = ctx.read();
    guard.buyer_email.trim().is_empty() || !guard.payment_succeeded()
  })?;

  let notifier = services.notifier.clone();
  flow.on(SEND_CONFIRMATION, move |ctx: FlowContext<CheckoutState>| {
    let notifier = notifier.clone();
    async move {
      let order = ctx
        .read()
        .order
        .clone()
        .ok_or_else(|| CheckoutError::missing(SEND_CONFIRMATION, "order"))?;
      let message_id = notifier
        .send_order_confirmation(&order)
        .await
        .map_err(collaborator("notifier"))?;
      info!(order_id = %order.id, %message_id, "Order confirmation sent.");
      ctx.write().confirmation_message_id = Some(message_id);
      Ok::<_, CheckoutError>(StepControl::Continue)
    }
  })?;

  Ok(flow)
}

/// Runs `flow` over a fresh context and hands back the final state.
#[instrument(
  name = "checkout::run_checkout",
  skip_all,
  fields(user_id = %state.user_id, lines = state.lines.len()),
  err(Display)
)]
pub async fn run_checkout(flow: &CheckoutFlow, state: CheckoutState) -> Result<CheckoutReport, CheckoutError> {
  let ctx = FlowContext::new(state);
  let outcome = flow.run(ctx.clone()).await?;
  let state = ctx.read().clone();
  Ok(CheckoutReport { outcome, state })
}
