// cashbak/src/settlement.rs

//! Resolving events and turning locked cashback percentages into payouts.

use crate::catalog::EventSource;
use crate::error::SettlementError;
use crate::model::{Event, EventOutcome, OrderItem};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

impl Event {
  /// Records the result once the event has ended. A resolved event never changes again.
  /// `ends_at` is read in `zone`; `now` is compared as an absolute instant.
  pub fn resolve(&mut self, won: bool, zone: Tz, now: DateTime<Utc>) -> Result<EventOutcome, SettlementError> {
    if self.outcome.is_resolved() {
      return Err(SettlementError::AlreadyResolved { event_id: self.id });
    }
    if !self.has_ended_at(zone, now) {
      return Err(SettlementError::NotYetEnded { event_id: self.id });
    }
    self.outcome = if won { EventOutcome::Won } else { EventOutcome::Lost };
    info!(event_id = self.id, outcome = ?self.outcome, "Event resolved.");
    Ok(self.outcome)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Payout {
  /// Event not resolved yet (or unknown).
  Pending,
  Lost,
  Won { amount: i64 },
}

impl Payout {
  pub fn amount(self) -> i64 {
    match self {
      Payout::Won { amount } => amount,
      Payout::Pending | Payout::Lost => 0,
    }
  }
}

/// Payout for one order item from its locked percentage.
pub fn realized_payout(item: &OrderItem, outcome: EventOutcome) -> Payout {
  match outcome {
    EventOutcome::Unresolved => Payout::Pending,
    EventOutcome::Lost => Payout::Lost,
    EventOutcome::Won => Payout::Won {
      amount: item.price_at_purchase * i64::from(item.quantity) * i64::from(item.cashback_percentage) / 100,
    },
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemPayout {
  pub order_item_id: Uuid,
  pub event_id: i64,
  pub payout: Payout,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderPayouts {
  pub order_id: Uuid,
  pub items: Vec<ItemPayout>,
  pub total_won: i64,
  pub pending_items: usize,
}

pub fn order_payouts(order_id: Uuid, items: &[OrderItem], events: &dyn EventSource) -> OrderPayouts {
  let items: Vec<ItemPayout> = items
    .iter()
    .map(|item| {
      let outcome = events
        .find_event(item.event_id)
        .map_or(EventOutcome::Unresolved, |e| e.outcome);
      ItemPayout {
        order_item_id: item.id,
        event_id: item.event_id,
        payout: realized_payout(item, outcome),
      }
    })
    .collect();

  OrderPayouts {
    order_id,
    total_won: items.iter().map(|i| i.payout.amount()).sum(),
    pending_items: items.iter().filter(|i| i.payout == Payout::Pending).count(),
    items,
  }
}
