// cashbak/src/inventory.rs

//! Stock reservation at checkout. Every implementation must make a reservation
//! atomic: all lines are decremented or none are, and no level goes below zero.

use crate::error::StockError;
use crate::model::{CartLineItem, Product};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, instrument, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockRequest {
  pub product_id: i64,
  pub size: String,
  pub quantity: u32,
}

impl StockRequest {
  pub fn new(product_id: i64, size: impl Into<String>, quantity: u32) -> Self {
    Self {
      product_id,
      size: size.into(),
      quantity,
    }
  }
}

impl From<&CartLineItem> for StockRequest {
  fn from(line: &CartLineItem) -> Self {
    StockRequest::new(line.product_id, line.size.clone(), line.quantity)
  }
}

/// Merges requests for the same product and size, keeping first-seen order.
pub fn merge_requests(requests: &[StockRequest]) -> Result<Vec<StockRequest>, StockError> {
  let mut merged: Vec<StockRequest> = Vec::with_capacity(requests.len());
  for request in requests {
    if request.quantity == 0 {
      return Err(StockError::InvalidQuantity {
        product_id: request.product_id,
        size: request.size.clone(),
      });
    }
    match merged
      .iter_mut()
      .find(|m| m.product_id == request.product_id && m.size == request.size)
    {
      Some(existing) => existing.quantity = existing.quantity.saturating_add(request.quantity),
      None => merged.push(request.clone()),
    }
  }
  Ok(merged)
}

#[async_trait]
pub trait StockLedger: Send + Sync {
  /// Decrements every request or none of them.
  async fn reserve(&self, requests: &[StockRequest]) -> Result<(), StockError>;

  async fn available(&self, product_id: i64, size: &str) -> Result<u32, StockError>;
}

/// Stock levels behind one mutex; check-then-apply happens under a single lock.
#[derive(Debug, Default)]
pub struct InMemoryStockLedger {
  levels: Mutex<HashMap<i64, BTreeMap<String, u32>>>,
}

impl InMemoryStockLedger {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn from_products(products: &[Product]) -> Self {
    let levels = products.iter().map(|p| (p.id, p.stock.clone())).collect();
    Self {
      levels: Mutex::new(levels),
    }
  }

  pub fn set_level(&self, product_id: i64, size: impl Into<String>, units: u32) {
    self.levels.lock().entry(product_id).or_default().insert(size.into(), units);
  }
}

#[async_trait]
impl StockLedger for InMemoryStockLedger {
  #[instrument(name = "InMemoryStockLedger::reserve", skip_all, fields(lines = requests.len()), err(Display))]
  async fn reserve(&self, requests: &[StockRequest]) -> Result<(), StockError> {
    let merged = merge_requests(requests)?;
    let mut levels = self.levels.lock();

    for request in &merged {
      let sizes = levels.get(&request.product_id).ok_or(StockError::UnknownProduct {
        product_id: request.product_id,
      })?;
      let available = *sizes.get(&request.size).ok_or_else(|| StockError::UnknownSize {
        product_id: request.product_id,
        size: request.size.clone(),
      })?;
      if available < request.quantity {
        warn!(
          product_id = request.product_id,
          size = %request.size,
          available,
          requested = request.quantity,
          "Reservation rejected: insufficient stock."
        );
        return Err(StockError::InsufficientStock {
          product_id: request.product_id,
          size: request.size.clone(),
          available,
          requested: request.quantity,
        });
      }
    }

    for request in &merged {
      if let Some(units) = levels
        .get_mut(&request.product_id)
        .and_then(|sizes| sizes.get_mut(&request.size))
      {
        *units -= request.quantity;
      }
    }
    debug!("Reservation applied.");
    Ok(())
  }

  async fn available(&self, product_id: i64, size: &str) -> Result<u32, StockError> {
    let levels = self.levels.lock();
    let sizes = levels.get(&product_id).ok_or(StockError::UnknownProduct { product_id })?;
    sizes.get(size).copied().ok_or_else(|| StockError::UnknownSize {
      product_id,
      size: size.to_string(),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn merge_sums_duplicate_lines() {
    let merged = merge_requests(&[
      StockRequest::new(1, "M", 2),
      StockRequest::new(2, "L", 1),
      StockRequest::new(1, "M", 3),
    ])
    .unwrap();
    assert_eq!(merged, vec![StockRequest::new(1, "M", 5), StockRequest::new(2, "L", 1)]);
  }

  #[test]
  fn merge_rejects_zero_quantity() {
    let err = merge_requests(&[StockRequest::new(1, "M", 0)]).unwrap_err();
    assert!(matches!(err, StockError::InvalidQuantity { product_id: 1, .. }));
  }
}
