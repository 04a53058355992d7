// cashbak/src/lib.rs

//! CashBak core: the cashback pricing engine and the domain around it.
//!
//! A purchase is paired with a sporting event. If the event is won, the buyer
//! gets back a percentage of the price, and the merchant hedges that promise by
//! staking at the event's odds. This crate holds:
//!  - the pricing formula and the engine that applies it per event/category,
//!  - typed catalog, cart and order records,
//!  - the stock ledger contract (atomic, never negative),
//!  - settlement of events into realized payouts,
//!  - a small async step runner and the checkout flow built on top of it.

pub mod catalog;
pub mod checkout;
pub mod clock;
pub mod error;
pub mod flow;
pub mod inventory;
pub mod model;
pub mod pricing;
pub mod settlement;

// --- Re-exports for the Public API ---

pub use crate::catalog::{EventSource, InMemoryCatalog, ProductSource};
pub use crate::checkout::{
  build_checkout_flow, run_checkout, CheckoutFlow, CheckoutReport, CheckoutServices, CheckoutState, Notifier,
  OrderStore, PaymentConfirmation, PaymentGateway, PaymentRedirect, PaymentRequest,
};
pub use crate::clock::{Clock, FixedClock, SystemClock};
pub use crate::error::{CheckoutError, ConfigError, FlowError, FlowResult, SettlementError, StockError};
pub use crate::flow::{Flow, FlowContext, FlowOutcome, StepControl};
pub use crate::inventory::{InMemoryStockLedger, StockLedger, StockRequest};
pub use crate::model::{cart_total, CartLineItem, Event, EventOutcome, Order, OrderItem, OrderStatus, PriceBasis, Product};
pub use crate::pricing::{PricingConfig, PricingEngine, PrintSurcharge, Quote};
pub use crate::settlement::{order_payouts, realized_payout, OrderPayouts, Payout};
