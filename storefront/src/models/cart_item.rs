// cashbak/storefront/src/models/cart_item.rs

use crate::errors::AppError;
use crate::models::narrow;
use cashbak::CartLineItem;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A cart line with the quote locked when it was added. `product_name` comes from a join.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CartItemRow {
  pub id: Uuid,
  pub user_id: Uuid,
  pub product_id: i64,
  pub product_name: String,
  pub size: String,
  pub quantity: i32,
  pub print: bool,
  pub unit_price: i64,
  pub event_id: i64,
  pub cashback_percent: i16,
  pub stake_amount: f64,
  pub added_at: DateTime<Utc>,
}

impl TryFrom<CartItemRow> for CartLineItem {
  type Error = AppError;

  fn try_from(row: CartItemRow) -> Result<Self, Self::Error> {
    Ok(CartLineItem {
      product_id: row.product_id,
      product_name: row.product_name,
      size: row.size,
      quantity: narrow(row.quantity, "cart_items.quantity")?,
      print: row.print,
      unit_price: row.unit_price,
      event_id: row.event_id,
      cashback_percent: narrow(row.cashback_percent, "cart_items.cashback_percent")?,
      stake_amount: row.stake_amount,
    })
  }
}
