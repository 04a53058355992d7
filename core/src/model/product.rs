// cashbak/src/model/product.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The (price, cost) pair the pricing formula runs on, in whole currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBasis {
  pub price: i64,
  pub cost: i64,
}

impl PriceBasis {
  pub fn new(price: i64, cost: i64) -> Self {
    Self { price, cost }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
  pub id: i64,
  pub name: String,
  pub description: Option<String>,
  pub price: i64,
  pub cost: i64,
  /// Grouping used to pick a representative product for aggregate pricing.
  pub category: i32,
  /// Available units per size label.
  pub stock: BTreeMap<String, u32>,
}

impl Product {
  pub fn basis(&self) -> PriceBasis {
    PriceBasis::new(self.price, self.cost)
  }

  pub fn available(&self, size: &str) -> Option<u32> {
    self.stock.get(size).copied()
  }

  pub fn total_stock(&self) -> u64 {
    self.stock.values().map(|&units| u64::from(units)).sum()
  }
}
