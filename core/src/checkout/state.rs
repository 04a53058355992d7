// cashbak/src/checkout/state.rs

use crate::checkout::collaborators::PaymentConfirmation;
use crate::model::{CartLineItem, Order, OrderStatus};
use uuid::Uuid;

/// Everything the checkout flow reads and fills in, shared between its steps.
#[derive(Debug, Clone)]
pub struct CheckoutState {
  pub user_id: Uuid,
  pub buyer_email: String,
  pub currency: String,
  /// Token returned by the gateway when the transaction was created.
  pub payment_token: String,
  pub lines: Vec<CartLineItem>,

  pub order: Option<Order>,
  pub payment: Option<PaymentConfirmation>,
  pub stock_reserved: bool,
  pub confirmation_message_id: Option<String>,
  /// Why the flow stopped early, if it did.
  pub failure_reason: Option<String>,
}

impl CheckoutState {
  pub fn new(
    user_id: Uuid,
    buyer_email: impl Into<String>,
    currency: impl Into<String>,
    payment_token: impl Into<String>,
    lines: Vec<CartLineItem>,
  ) -> Self {
    Self {
      user_id,
      buyer_email: buyer_email.into(),
      currency: currency.into(),
      payment_token: payment_token.into(),
      lines,
      order: None,
      payment: None,
      stock_reserved: false,
      confirmation_message_id: None,
      failure_reason: None,
    }
  }

  /// True once the order has been marked paid.
  pub fn payment_succeeded(&self) -> bool {
    self.order.as_ref().is_some_and(|o| o.status == OrderStatus::Paid)
  }

  pub fn confirmation_sent(&self) -> bool {
    self.confirmation_message_id.is_some()
  }
}
