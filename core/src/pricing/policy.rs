// cashbak/src/pricing/policy.rs

use crate::error::ConfigError;
use crate::model::PriceBasis;
use chrono_tz::Tz;

pub const DEFAULT_MARGIN_RATE: f64 = 0.4;
pub const DEFAULT_PRINT_PRICE_ADD: i64 = 2990;
pub const DEFAULT_PRINT_COST_ADD: i64 = 2500;
pub const DEFAULT_REFERENCE_ZONE: Tz = chrono_tz::America::Santiago;

/// Fixed amounts added to price and cost when a product carries a print.
/// `cost_add` is also the floor in the cost-proportional margin rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrintSurcharge {
  pub price_add: i64,
  pub cost_add: i64,
}

impl Default for PrintSurcharge {
  fn default() -> Self {
    Self {
      price_add: DEFAULT_PRINT_PRICE_ADD,
      cost_add: DEFAULT_PRINT_COST_ADD,
    }
  }
}

/// Request-scoped pricing settings, passed explicitly into every pricing call.
#[derive(Debug, Clone, PartialEq)]
pub struct PricingConfig {
  /// Share of cost the merchant keeps even when the event is won.
  pub margin_rate: f64,
  pub print: PrintSurcharge,
  /// Zone in which event end times are evaluated.
  pub reference_zone: Tz,
}

impl Default for PricingConfig {
  fn default() -> Self {
    Self {
      margin_rate: DEFAULT_MARGIN_RATE,
      print: PrintSurcharge::default(),
      reference_zone: DEFAULT_REFERENCE_ZONE,
    }
  }
}

impl PricingConfig {
  pub fn validate(&self) -> Result<(), ConfigError> {
    if !(self.margin_rate.is_finite() && (0.0..1.0).contains(&self.margin_rate)) {
      return Err(ConfigError::MarginRate(self.margin_rate));
    }
    if self.print.price_add < 0 || self.print.cost_add < 0 {
      return Err(ConfigError::PrintSurcharge {
        price_add: self.print.price_add,
        cost_add: self.print.cost_add,
      });
    }
    Ok(())
  }

  pub fn with_zone_name(mut self, zone_name: &str) -> Result<Self, ConfigError> {
    self.reference_zone = zone_name
      .parse::<Tz>()
      .map_err(|_| ConfigError::TimeZone(zone_name.to_string()))?;
    Ok(self)
  }

  /// Returns the basis and margin rate the formula should run on.
  ///
  /// With a print, price and cost grow by the surcharge and the rate becomes
  /// `cost * margin_rate / (cost + cost_add)` on the original cost, so the
  /// reserved amount stays `margin_rate * cost`.
  pub fn effective_terms(&self, basis: PriceBasis, print: bool) -> (PriceBasis, f64) {
    if !print {
      return (basis, self.margin_rate);
    }

    let adjusted = PriceBasis::new(basis.price + self.print.price_add, basis.cost + self.print.cost_add);
    let denominator = (basis.cost + self.print.cost_add) as f64;
    let rate = if denominator > 0.0 {
      (basis.cost as f64 * self.margin_rate) / denominator
    } else {
      0.0
    };
    (adjusted, rate)
  }
}
