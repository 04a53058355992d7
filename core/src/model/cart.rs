// cashbak/src/model/cart.rs

use crate::model::product::Product;
use crate::pricing::Quote;
use serde::{Deserialize, Serialize};

/// One product/size/event selection, with the quote locked when it was added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLineItem {
  pub product_id: i64,
  pub product_name: String,
  pub size: String,
  pub quantity: u32,
  pub print: bool,
  /// Unit price charged, print surcharge included.
  pub unit_price: i64,
  pub event_id: i64,
  pub cashback_percent: u8,
  /// Stake per unit the merchant places to hedge this line's promise.
  pub stake_amount: f64,
}

impl CartLineItem {
  /// Builds a line from a quote. Price, percent and stake all come from that one quote.
  pub fn from_quote(product: &Product, size: impl Into<String>, quantity: u32, event_id: i64, quote: &Quote) -> Self {
    Self {
      product_id: product.id,
      product_name: product.name.clone(),
      size: size.into(),
      quantity,
      print: quote.print,
      unit_price: quote.basis.price,
      event_id,
      cashback_percent: quote.percent,
      stake_amount: quote.stake_amount,
    }
  }

  pub fn line_total(&self) -> i64 {
    self.unit_price * i64::from(self.quantity)
  }

  /// Cashback owed on this line if its event is won.
  pub fn projected_payout(&self) -> i64 {
    self.line_total() * i64::from(self.cashback_percent) / 100
  }

  pub fn total_stake(&self) -> f64 {
    self.stake_amount * f64::from(self.quantity)
  }
}

pub fn cart_total(items: &[CartLineItem]) -> i64 {
  items.iter().map(CartLineItem::line_total).sum()
}
