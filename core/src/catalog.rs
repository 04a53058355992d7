// cashbak/src/catalog.rs

//! Lookups the pricing engine consumes, and an in-memory implementation.

use crate::model::{Event, PriceBasis, Product};

pub trait EventSource {
  /// Every known event, open or not.
  fn events(&self) -> &[Event];

  fn find_event(&self, id: i64) -> Option<&Event> {
    self.events().iter().find(|e| e.id == id)
  }
}

pub trait ProductSource {
  /// Price/cost pair standing in for a whole category.
  fn find_representative_product(&self, category: i32) -> Option<PriceBasis>;
}

/// Events and products held in memory. The storefront fills one from storage
/// per request; tests build them directly.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
  events: Vec<Event>,
  products: Vec<Product>,
}

impl InMemoryCatalog {
  pub fn new(events: Vec<Event>, products: Vec<Product>) -> Self {
    Self { events, products }
  }

  pub fn with_event(mut self, event: Event) -> Self {
    self.events.push(event);
    self
  }

  pub fn with_product(mut self, product: Product) -> Self {
    self.products.push(product);
    self
  }

  pub fn products(&self) -> &[Product] {
    &self.products
  }

  pub fn find_product(&self, id: i64) -> Option<&Product> {
    self.products.iter().find(|p| p.id == id)
  }
}

impl EventSource for InMemoryCatalog {
  fn events(&self) -> &[Event] {
    &self.events
  }
}

impl ProductSource for InMemoryCatalog {
  /// Matches on `category` equality; the lowest product id wins a tie.
  fn find_representative_product(&self, category: i32) -> Option<PriceBasis> {
    self
      .products
      .iter()
      .filter(|p| p.category == category)
      .min_by_key(|p| p.id)
      .map(Product::basis)
  }
}
