// cashbak/src/model/order.rs

use crate::model::cart::{cart_total, CartLineItem};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
  Pending,
  Paid,
  Failed,
}

/// Snapshot of a purchased line. `cashback_percentage` is the figure used at
/// settlement; it is never recomputed from current product or event state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
  pub id: Uuid,
  pub order_id: Uuid,
  pub product_id: i64,
  pub size: String,
  pub quantity: u32,
  pub print: bool,
  pub price_at_purchase: i64,
  pub event_id: i64,
  pub cashback_percentage: u8,
  pub stake_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
  pub id: Uuid,
  pub user_id: Uuid,
  pub buyer_email: String,
  pub status: OrderStatus,
  pub total_amount: i64,
  pub currency: String,
  pub payment_token: String,
  pub authorization_code: Option<String>,
  pub created_at: DateTime<Utc>,
  pub items: Vec<OrderItem>,
}

impl Order {
  /// Freezes the cart into a pending order.
  pub fn snapshot(
    user_id: Uuid,
    buyer_email: impl Into<String>,
    currency: impl Into<String>,
    payment_token: impl Into<String>,
    lines: &[CartLineItem],
  ) -> Self {
    let order_id = Uuid::new_v4();
    let items = lines
      .iter()
      .map(|line| OrderItem {
        id: Uuid::new_v4(),
        order_id,
        product_id: line.product_id,
        size: line.size.clone(),
        quantity: line.quantity,
        print: line.print,
        price_at_purchase: line.unit_price,
        event_id: line.event_id,
        cashback_percentage: line.cashback_percent,
        stake_amount: line.stake_amount,
      })
      .collect();

    Self {
      id: order_id,
      user_id,
      buyer_email: buyer_email.into(),
      status: OrderStatus::Pending,
      total_amount: cart_total(lines),
      currency: currency.into(),
      payment_token: payment_token.into(),
      authorization_code: None,
      created_at: Utc::now(),
      items,
    }
  }
}
