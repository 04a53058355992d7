// cashbak/storefront/src/config.rs

use crate::errors::{AppError, Result};
use cashbak::pricing::policy::{DEFAULT_MARGIN_RATE, DEFAULT_PRINT_COST_ADD, DEFAULT_PRINT_PRICE_ADD};
use cashbak::{PricingConfig, PrintSurcharge};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub database_url: String,
  pub app_base_url: String,

  // Pricing
  pub cashback_margin_rate: f64,
  pub reference_timezone: String,
  pub print_price_add: i64,
  pub print_cost_add: i64,
  pub currency: String,

  // Mock Webpay
  pub mock_webpay_commerce_code: String,
  pub mock_webpay_latency_ms: u64,

  pub mock_email_sender: String,

  pub seed_db: bool,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present
    Self::from_lookup(|var_name| env::var(var_name).ok())
  }

  /// Builds the config from any variable source; `from_env` passes the process environment.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let required = |var_name: &str| {
      lookup(var_name).ok_or_else(|| AppError::Config(format!("Missing environment variable '{}'", var_name)))
    };
    let or_default = |var_name: &str, default: &str| lookup(var_name).unwrap_or_else(|| default.to_string());

    let server_host = or_default("SERVER_HOST", "127.0.0.1");
    let server_port = parse_var::<u16>("SERVER_PORT", &or_default("SERVER_PORT", "8080"))?;
    let database_url = required("DATABASE_URL")?;
    let app_base_url =
      lookup("APP_BASE_URL").unwrap_or_else(|| format!("http://{}:{}", server_host, server_port));

    let cashback_margin_rate = parse_var::<f64>(
      "CASHBACK_MARGIN_RATE",
      &or_default("CASHBACK_MARGIN_RATE", &DEFAULT_MARGIN_RATE.to_string()),
    )?;
    let reference_timezone = or_default("REFERENCE_TIMEZONE", "America/Santiago");
    let print_price_add = parse_var::<i64>(
      "PRINT_PRICE_ADD",
      &or_default("PRINT_PRICE_ADD", &DEFAULT_PRINT_PRICE_ADD.to_string()),
    )?;
    let print_cost_add = parse_var::<i64>(
      "PRINT_COST_ADD",
      &or_default("PRINT_COST_ADD", &DEFAULT_PRINT_COST_ADD.to_string()),
    )?;
    let currency = or_default("CURRENCY", "CLP");

    let mock_webpay_commerce_code = or_default("MOCK_WEBPAY_COMMERCE_CODE", "597055555532");
    let mock_webpay_latency_ms = parse_var::<u64>(
      "MOCK_WEBPAY_LATENCY_MS",
      &or_default("MOCK_WEBPAY_LATENCY_MS", "50"),
    )?;
    let mock_email_sender = or_default("MOCK_EMAIL_SENDER", "noreply@cashbak.cl");

    let seed_db = parse_var::<bool>("SEED_DB", &or_default("SEED_DB", "false"))?;

    tracing::info!("Application configuration loaded successfully.");

    Ok(Self {
      server_host,
      server_port,
      database_url,
      app_base_url,
      cashback_margin_rate,
      reference_timezone,
      print_price_add,
      print_cost_add,
      currency,
      mock_webpay_commerce_code,
      mock_webpay_latency_ms,
      mock_email_sender,
      seed_db,
    })
  }

  /// The validated pricing settings handed to every engine call.
  pub fn pricing_config(&self) -> Result<PricingConfig> {
    let config = PricingConfig {
      margin_rate: self.cashback_margin_rate,
      print: PrintSurcharge {
        price_add: self.print_price_add,
        cost_add: self.print_cost_add,
      },
      ..PricingConfig::default()
    }
    .with_zone_name(&self.reference_timezone)?;
    config.validate()?;
    Ok(config)
  }
}

fn parse_var<T>(var_name: &str, raw: &str) -> Result<T>
where
  T: FromStr,
  T::Err: std::fmt::Display,
{
  raw
    .trim()
    .parse::<T>()
    .map_err(|e| AppError::Config(format!("Invalid {} value '{}': {}", var_name, raw, e)))
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  fn config_from(vars: &[(&str, &str)]) -> Result<AppConfig> {
    let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    AppConfig::from_lookup(|name| vars.get(name).cloned())
  }

  #[test]
  fn defaults_apply_when_only_database_url_is_set() {
    let config = config_from(&[("DATABASE_URL", "postgres://localhost/cashbak")]).unwrap();
    assert_eq!(config.server_port, 8080);
    assert_eq!(config.app_base_url, "http://127.0.0.1:8080");
    assert_eq!(config.currency, "CLP");
    assert!(!config.seed_db);

    let pricing = config.pricing_config().unwrap();
    assert_eq!(pricing, PricingConfig::default());
  }

  #[test]
  fn missing_database_url_is_an_error() {
    assert!(matches!(config_from(&[]), Err(AppError::Config(_))));
  }

  #[test]
  fn pricing_overrides_are_validated() {
    let config = config_from(&[
      ("DATABASE_URL", "postgres://localhost/cashbak"),
      ("CASHBACK_MARGIN_RATE", "0.25"),
      ("REFERENCE_TIMEZONE", "America/Argentina/Buenos_Aires"),
    ])
    .unwrap();
    let pricing = config.pricing_config().unwrap();
    assert_eq!(pricing.margin_rate, 0.25);
    assert_eq!(pricing.reference_zone.name(), "America/Argentina/Buenos_Aires");

    let bad_zone = config_from(&[("DATABASE_URL", "x"), ("REFERENCE_TIMEZONE", "Nowhere/Special")]).unwrap();
    assert!(matches!(bad_zone.pricing_config(), Err(AppError::Config(_))));

    let bad_rate = config_from(&[("DATABASE_URL", "x"), ("CASHBACK_MARGIN_RATE", "1.2")]).unwrap();
    assert!(bad_rate.pricing_config().is_err());
  }

  #[test]
  fn unparsable_values_are_rejected() {
    let err = config_from(&[("DATABASE_URL", "x"), ("SERVER_PORT", "eighty")]).unwrap_err();
    assert!(err.to_string().contains("SERVER_PORT"));
  }
}
