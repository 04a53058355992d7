// cashbak/src/pricing/engine.rs

//! Pricing queries over the collaborator lookups. Stateless: build one per
//! request from borrowed sources and drop it.

use crate::catalog::{EventSource, ProductSource};
use crate::clock::Clock;
use crate::model::{Event, PriceBasis};
use crate::pricing::formula::Quote;
use crate::pricing::policy::PricingConfig;
use tracing::{debug, instrument};

pub struct PricingEngine<'a> {
  config: &'a PricingConfig,
  events: &'a dyn EventSource,
  products: &'a dyn ProductSource,
  clock: &'a dyn Clock,
}

impl<'a> PricingEngine<'a> {
  pub fn new(
    config: &'a PricingConfig,
    events: &'a dyn EventSource,
    products: &'a dyn ProductSource,
    clock: &'a dyn Clock,
  ) -> Self {
    Self {
      config,
      events,
      products,
      clock,
    }
  }

  /// Unresolved events whose end, read in the reference zone, is still ahead.
  pub fn valid_events(&self) -> Vec<&'a Event> {
    let events: &'a dyn EventSource = self.events;
    let (zone, now) = (self.config.reference_zone, self.clock.now_utc());
    events.events().iter().filter(|e| e.is_open_at(zone, now)).collect()
  }

  /// An event the buyer may still pick. Expired and unknown ids give `None`.
  pub fn selectable_event(&self, event_id: i64) -> Option<&'a Event> {
    let events: &'a dyn EventSource = self.events;
    let (zone, now) = (self.config.reference_zone, self.clock.now_utc());
    events.find_event(event_id).filter(|e| e.is_open_at(zone, now))
  }

  /// Quote for a specific basis, e.g. the exact product being added to a cart.
  pub fn quote_for(&self, event: Option<&Event>, basis: PriceBasis, print: bool) -> Quote {
    let odds = event.map(Event::effective_odds).unwrap_or(0.0);
    Quote::compute(odds, basis, print, self.config)
  }

  /// Quote for an event against the category's representative product.
  /// `None` only when the category has no product.
  #[instrument(name = "PricingEngine::quote", skip(self), level = "debug")]
  pub fn quote(&self, event_id: i64, category: i32, print: bool) -> Option<Quote> {
    let Some(basis) = self.products.find_representative_product(category) else {
      debug!("No representative product for category.");
      return None;
    };
    let event = self.selectable_event(event_id);
    if event.is_none() {
      debug!("Event not selectable; quoting zero odds.");
    }
    Some(self.quote_for(event, basis, print))
  }

  pub fn cashback_percent(&self, event_id: i64, category: i32, print: bool) -> u8 {
    self.quote(event_id, category, print).map_or(0, |q| q.percent)
  }

  pub fn stake_amount(&self, event_id: i64, category: i32, print: bool) -> f64 {
    self.quote(event_id, category, print).map_or(0.0, |q| q.stake_amount)
  }

  /// Best open event for a category, with its quote.
  pub fn best_quote_for_category(&self, category: i32, print: bool) -> Option<(&'a Event, Quote)> {
    let basis = self.products.find_representative_product(category)?;
    self
      .valid_events()
      .into_iter()
      .map(|event| (event, self.quote_for(Some(event), basis, print)))
      .fold(None, |best: Option<(&'a Event, Quote)>, candidate| match best {
        Some(current) if current.1.percent >= candidate.1.percent => Some(current),
        _ => Some(candidate),
      })
  }

  /// "Cashback up to X%" for a category, over currently open events.
  #[instrument(name = "PricingEngine::max_cashback_for_category", skip(self), level = "debug")]
  pub fn max_cashback_for_category(&self, category: i32) -> u8 {
    self
      .best_quote_for_category(category, false)
      .map_or(0, |(_, quote)| quote.percent)
  }
}
