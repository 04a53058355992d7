// cashbak/src/pricing/mod.rs

//! The cashback pricing engine: how much of the price a buyer gets back if
//! their event wins, and how much the merchant stakes to cover it.

pub mod engine;
pub mod formula;
pub mod policy;

pub use engine::PricingEngine;
pub use formula::{cashback_fraction, percent_from_fraction, stake_for, Quote};
pub use policy::{PricingConfig, PrintSurcharge};
