// cashbak/src/clock.rs

//! Current time, as an instant and as wall-clock time in the reference zone.
//! Expiry compares instants; local time is for display and storage.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

pub trait Clock: Send + Sync {
  fn now_utc(&self) -> DateTime<Utc>;

  fn now_in(&self, zone: Tz) -> NaiveDateTime {
    self.now_utc().with_timezone(&zone).naive_local()
  }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now_utc(&self) -> DateTime<Utc> {
    Utc::now()
  }
}

/// A clock pinned to one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
  pub fn new(instant: DateTime<Utc>) -> Self {
    FixedClock(instant)
  }

  /// Pins the clock to a wall-clock time in `zone`. `None` when that local
  /// time does not exist (skipped by a DST jump).
  pub fn at_local(zone: Tz, local: NaiveDateTime) -> Option<Self> {
    zone
      .from_local_datetime(&local)
      .earliest()
      .map(|instant| FixedClock(instant.with_timezone(&Utc)))
  }
}

impl Clock for FixedClock {
  fn now_utc(&self) -> DateTime<Utc> {
    self.0
  }
}
