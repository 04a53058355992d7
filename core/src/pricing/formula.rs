// cashbak/src/pricing/formula.rs

//! The cashback formula and its companion stake computation.
//!
//! ```text
//! raw      = (odds / price) * (price - cost - margin_rate * cost)
//! fraction = clamp(raw, 0, 1)
//! percent  = floor(fraction * 100)
//! stake    = fraction * price / odds
//! ```
//!
//! A won event pays `fraction * price` to the buyer, which is exactly what
//! `stake` returns at `odds`. Nothing here fails: bad inputs give zero.

use crate::model::PriceBasis;
use crate::pricing::policy::PricingConfig;
use serde::Serialize;

/// Absorbs binary representation error before flooring (0.29 * 100 is 28.999...).
///
/// With whole-unit prices below 10^7 and two-decimal odds, an exact fraction
/// is either a whole percent or at least 2e-8 percent away from one, so this
/// never lifts a genuinely lower fraction to the next percent.
const PERCENT_EPSILON: f64 = 1e-9;

/// Fraction of the price returned to the buyer, in `[0, 1]`.
pub fn cashback_fraction(odds: f64, price: f64, cost: f64, margin_rate: f64) -> f64 {
  if !(odds > 0.0 && price > 0.0) {
    return 0.0;
  }
  let raw = odds * (price - cost - margin_rate * cost) / price;
  if raw.is_nan() {
    return 0.0;
  }
  raw.clamp(0.0, 1.0)
}

/// Whole percent, always rounded down.
pub fn percent_from_fraction(fraction: f64) -> u8 {
  if !(fraction > 0.0) {
    return 0;
  }
  let percent = (fraction.min(1.0) * 100.0 + PERCENT_EPSILON).floor();
  percent as u8
}

/// Amount to wager at `odds` so that a win returns `fraction * price`.
pub fn stake_for(fraction: f64, price: f64, odds: f64) -> f64 {
  if !(odds > 0.0) || !(fraction > 0.0) || !(price > 0.0) {
    return 0.0;
  }
  fraction * price / odds
}

/// Percent and stake computed together from one (odds, price, cost) triple.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Quote {
  pub odds: f64,
  /// Basis the formula ran on (print surcharge included).
  pub basis: PriceBasis,
  pub print: bool,
  pub margin_rate: f64,
  pub fraction: f64,
  pub percent: u8,
  pub stake_amount: f64,
}

impl Quote {
  pub fn compute(odds: f64, basis: PriceBasis, print: bool, config: &PricingConfig) -> Self {
    let (effective, margin_rate) = config.effective_terms(basis, print);
    let price = effective.price as f64;
    let fraction = cashback_fraction(odds, price, effective.cost as f64, margin_rate);

    Self {
      odds,
      basis: effective,
      print,
      margin_rate,
      fraction,
      percent: percent_from_fraction(fraction),
      stake_amount: stake_for(fraction, price, odds),
    }
  }

  /// Cashback paid on `quantity` units if the event is won.
  pub fn projected_payout(&self, quantity: u32) -> i64 {
    self.basis.price * i64::from(quantity) * i64::from(self.percent) / 100
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn quote(odds: f64, price: i64, cost: i64) -> Quote {
    Quote::compute(odds, PriceBasis::new(price, cost), false, &PricingConfig::default())
  }

  #[test]
  fn high_odds_clamp_to_full_cashback() {
    let q = quote(3.55, 29990, 12000);
    assert_eq!(q.fraction, 1.0);
    assert_eq!(q.percent, 100);
    assert!((q.stake_amount - 29990.0 / 3.55).abs() < 1e-6);
    assert_eq!(q.stake_amount.round() as i64, 8448);
    assert_eq!(q.stake_amount.floor() as i64, 8447);

    assert_eq!(quote(7.3, 15000, 9000).percent, 100);
  }

  #[test]
  fn low_odds_yield_partial_cashback() {
    let q = quote(1.2, 20000, 5000);
    assert!((q.fraction - 0.78).abs() < 1e-12);
    assert_eq!(q.percent, 78);
    assert!((q.stake_amount * 1.2 - 0.78 * 20000.0).abs() < 1e-6);
  }

  #[test]
  fn missing_odds_give_zero() {
    let q = quote(0.0, 20000, 5000);
    assert_eq!(q.percent, 0);
    assert_eq!(q.stake_amount, 0.0);
    assert_eq!(cashback_fraction(f64::NAN, 100.0, 10.0, 0.4), 0.0);
  }

  #[test]
  fn degenerate_price_gives_zero() {
    assert_eq!(cashback_fraction(2.0, 0.0, 0.0, 0.4), 0.0);
    assert_eq!(cashback_fraction(2.0, -500.0, 100.0, 0.4), 0.0);
    assert_eq!(stake_for(0.5, 0.0, 2.0), 0.0);
  }

  #[test]
  fn negative_margin_clamps_to_zero() {
    // cost above price: no margin left to promise
    let q = quote(5.0, 10000, 12000);
    assert_eq!(q.fraction, 0.0);
    assert_eq!(q.percent, 0);
    assert_eq!(q.stake_amount, 0.0);
  }

  #[test]
  fn percent_floor_survives_representation_error() {
    assert_eq!(percent_from_fraction(0.29), 29);
    assert_eq!(percent_from_fraction(0.5799999), 57);
    assert_eq!(percent_from_fraction(1.0), 100);
    assert_eq!(percent_from_fraction(0.0), 0);
  }

  #[test]
  fn fraction_just_below_a_percent_is_not_lifted() {
    assert_eq!(percent_from_fraction(0.4999999999), 49);
    // (9999999 - 1.4 * 3571428) / 9999999 = 0.49999998...
    let q = quote(1.0, 9_999_999, 3_571_428);
    assert!(q.fraction < 0.5);
    assert_eq!(q.percent, 49);
  }

  #[test]
  fn print_mode_adjusts_basis_and_rate() {
    let config = PricingConfig::default();
    let q = Quote::compute(1.1, PriceBasis::new(20000, 5000), true, &config);
    assert_eq!(q.basis, PriceBasis::new(22990, 7500));
    assert!((q.margin_rate - 5000.0 * 0.4 / 7500.0).abs() < 1e-12);
    // reserved margin is still 40% of the original cost
    assert!((q.margin_rate * 7500.0 - 2000.0).abs() < 1e-9);
    let expected = 1.1 * (22990.0 - 7500.0 - 2000.0) / 22990.0;
    assert!((q.fraction - expected).abs() < 1e-12);
    assert_eq!(q.percent, 64);
  }

  #[test]
  fn projected_payout_uses_locked_percent() {
    let q = quote(1.2, 20000, 5000);
    assert_eq!(q.projected_payout(2), 31200);
  }
}
