// cashbak/src/model/event.rs

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Settlement state of an event. Moves from `Unresolved` to `Won` or `Lost` once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventOutcome {
  #[default]
  Unresolved,
  Won,
  Lost,
}

impl EventOutcome {
  /// Maps the nullable `is_winner` column to an outcome.
  pub fn from_flag(is_winner: Option<bool>) -> Self {
    match is_winner {
      None => EventOutcome::Unresolved,
      Some(true) => EventOutcome::Won,
      Some(false) => EventOutcome::Lost,
    }
  }

  pub fn as_flag(self) -> Option<bool> {
    match self {
      EventOutcome::Unresolved => None,
      EventOutcome::Won => Some(true),
      EventOutcome::Lost => Some(false),
    }
  }

  pub fn is_resolved(self) -> bool {
    self != EventOutcome::Unresolved
  }
}

/// A bettable proposition offered alongside a purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
  pub id: i64,
  pub name: String,
  /// Decimal payout multiplier. Zero means no odds are known.
  pub odds: f64,
  /// Wall-clock end time in the reference zone.
  pub ends_at: NaiveDateTime,
  pub outcome: EventOutcome,
}

impl Event {
  pub fn new(id: i64, name: impl Into<String>, odds: f64, ends_at: NaiveDateTime) -> Self {
    Self {
      id,
      name: name.into(),
      odds,
      ends_at,
      outcome: EventOutcome::Unresolved,
    }
  }

  /// The instant `ends_at` denotes in `zone`.
  ///
  /// A wall-clock time repeated by a fall-back transition resolves to its
  /// first occurrence. A time skipped by a spring-forward gap is read with the
  /// offset in effect just before the gap.
  pub fn ends_at_instant(&self, zone: Tz) -> DateTime<Utc> {
    zone
      .from_local_datetime(&self.ends_at)
      .earliest()
      .or_else(|| {
        zone
          .from_local_datetime(&(self.ends_at - Duration::hours(1)))
          .earliest()
          .map(|before_gap| before_gap + Duration::hours(1))
      })
      .map_or_else(|| Utc.from_utc_datetime(&self.ends_at), |instant| instant.with_timezone(&Utc))
  }

  pub fn has_ended_at(&self, zone: Tz, now: DateTime<Utc>) -> bool {
    self.ends_at_instant(zone) <= now
  }

  /// Selectable only while unresolved and its end lies strictly after `now`.
  pub fn is_open_at(&self, zone: Tz, now: DateTime<Utc>) -> bool {
    !self.outcome.is_resolved() && !self.has_ended_at(zone, now)
  }

  /// Odds usable by the pricing formula; anything non-finite or negative counts as missing.
  pub fn effective_odds(&self) -> f64 {
    if self.odds.is_finite() && self.odds > 0.0 {
      self.odds
    } else {
      0.0
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::NaiveDate;
  use chrono_tz::America::Santiago;

  fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, min, 0).unwrap()
  }

  fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.from_utc_datetime(&at(y, m, d, h, min))
  }

  #[test]
  fn repeated_hour_ends_at_first_occurrence() {
    // Clocks fall back from 24:00 (-03) to 23:00 (-04) on 2024-04-06.
    let ev = Event::new(1, "late kickoff", 2.0, at(2024, 4, 6, 23, 30));
    assert_eq!(ev.ends_at_instant(Santiago), utc(2024, 4, 7, 2, 30));
    assert!(ev.has_ended_at(Santiago, utc(2024, 4, 7, 2, 30)));
    assert!(ev.is_open_at(Santiago, utc(2024, 4, 7, 2, 29)));
    // 23:10 on the wall clock again, but the event is long over.
    assert!(!ev.is_open_at(Santiago, utc(2024, 4, 7, 3, 10)));
  }

  #[test]
  fn skipped_hour_uses_offset_before_gap() {
    // Clocks jump from 24:00 (-04) to 01:00 (-03) on 2024-09-08.
    let ev = Event::new(1, "midnight match", 2.0, at(2024, 9, 8, 0, 30));
    assert_eq!(ev.ends_at_instant(Santiago), utc(2024, 9, 8, 4, 30));
  }

  #[test]
  fn resolved_event_is_never_open() {
    let mut ev = Event::new(1, "final", 2.0, at(2024, 7, 20, 20, 0));
    assert!(ev.is_open_at(Santiago, utc(2024, 7, 15, 12, 0)));
    ev.outcome = EventOutcome::Lost;
    assert!(!ev.is_open_at(Santiago, utc(2024, 7, 15, 12, 0)));
  }
}
