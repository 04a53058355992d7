// cashbak/storefront/src/models/order.rs

use crate::errors::AppError;
use crate::models::narrow;
use cashbak::{OrderItem, OrderStatus};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, Type as SqlxType};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, SqlxType)]
#[sqlx(type_name = "order_status_enum", rename_all = "lowercase")]
pub enum OrderStatusDb {
  Pending,
  Paid,
  Failed,
}

impl From<OrderStatus> for OrderStatusDb {
  fn from(status: OrderStatus) -> Self {
    match status {
      OrderStatus::Pending => OrderStatusDb::Pending,
      OrderStatus::Paid => OrderStatusDb::Paid,
      OrderStatus::Failed => OrderStatusDb::Failed,
    }
  }
}

impl From<OrderStatusDb> for OrderStatus {
  fn from(status: OrderStatusDb) -> Self {
    match status {
      OrderStatusDb::Pending => OrderStatus::Pending,
      OrderStatusDb::Paid => OrderStatus::Paid,
      OrderStatusDb::Failed => OrderStatus::Failed,
    }
  }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OrderRow {
  pub id: Uuid,
  pub user_id: Uuid,
  pub buyer_email: String,
  pub status: OrderStatusDb,
  pub total_amount: i64,
  pub currency: String,
  pub payment_token: String,
  pub authorization_code: Option<String>,
  pub failure_reason: Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OrderItemRow {
  pub id: Uuid,
  pub order_id: Uuid,
  pub product_id: i64,
  pub size: String,
  pub quantity: i32,
  pub print: bool,
  pub price_at_purchase: i64,
  pub event_id: i64,
  pub cashback_percentage: i16,
  pub stake_amount: f64,
}

impl TryFrom<OrderItemRow> for OrderItem {
  type Error = AppError;

  fn try_from(row: OrderItemRow) -> Result<Self, Self::Error> {
    Ok(OrderItem {
      id: row.id,
      order_id: row.order_id,
      product_id: row.product_id,
      size: row.size,
      quantity: narrow(row.quantity, "order_items.quantity")?,
      print: row.print,
      price_at_purchase: row.price_at_purchase,
      event_id: row.event_id,
      cashback_percentage: narrow(row.cashback_percentage, "order_items.cashback_percentage")?,
      stake_amount: row.stake_amount,
    })
  }
}
