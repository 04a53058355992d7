// cashbak/storefront/src/models/event.rs

use cashbak::{Event, EventOutcome};
use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::FromRow;

/// `ends_at` is a `TIMESTAMP` (no zone) holding wall-clock time in the reference zone.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct EventRow {
  pub id: i64,
  pub name: String,
  pub odds: f64,
  pub ends_at: NaiveDateTime,
  pub is_winner: Option<bool>,
}

impl From<EventRow> for Event {
  fn from(row: EventRow) -> Self {
    Event {
      id: row.id,
      name: row.name,
      odds: row.odds,
      ends_at: row.ends_at,
      outcome: EventOutcome::from_flag(row.is_winner),
    }
  }
}
