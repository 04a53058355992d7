// cashbak/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;
use uuid::Uuid;

/// Failures raised by the step-flow runner itself, independent of any domain.
#[derive(Debug, Error)]
pub enum FlowError {
  #[error("Step not found: {step_name}")]
  StepNotFound { step_name: String },

  #[error("Handler missing for required step: {step_name}")]
  HandlerMissing { step_name: String },

  #[error("Error in step handler or external operation. Source: {source}")]
  HandlerError {
    #[source]
    source: AnyhowError,
  },
}

impl From<AnyhowError> for FlowError {
  fn from(err: AnyhowError) -> Self {
    FlowError::HandlerError { source: err }
  }
}

/// Rejections from a stock ledger. Stock never goes negative; a reservation
/// that would do so fails with `InsufficientStock` and changes nothing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StockError {
  #[error("Product {product_id} not found in stock ledger")]
  UnknownProduct { product_id: i64 },

  #[error("Product {product_id} has no size '{size}'")]
  UnknownSize { product_id: i64, size: String },

  #[error("Insufficient stock for product {product_id} size '{size}': {available} available, {requested} requested")]
  InsufficientStock {
    product_id: i64,
    size: String,
    available: u32,
    requested: u32,
  },

  #[error("Quantity must be positive (product {product_id}, size '{size}')")]
  InvalidQuantity { product_id: i64, size: String },

  #[error("Stock backend failure: {0}")]
  Backend(String),
}

/// Errors from resolving events.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SettlementError {
  #[error("Event {event_id} was already resolved")]
  AlreadyResolved { event_id: i64 },

  #[error("Event {event_id} has not ended yet")]
  NotYetEnded { event_id: i64 },
}

/// Invalid pricing configuration values.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
  #[error("Margin rate must be within [0, 1), got {0}")]
  MarginRate(f64),

  #[error("Print surcharge values must be non-negative (price +{price_add}, cost +{cost_add})")]
  PrintSurcharge { price_add: i64, cost_add: i64 },

  #[error("Unknown reference time zone '{0}'")]
  TimeZone(String),
}

/// Errors surfaced by the checkout flow.
#[derive(Debug, Error)]
pub enum CheckoutError {
  #[error("Checkout flow error: {source}")]
  Flow {
    #[from]
    source: FlowError,
  },

  #[error("Cart is empty")]
  EmptyCart,

  #[error("Checkout state missing '{what}' at step '{step_name}'")]
  MissingState { step_name: String, what: String },

  #[error("Stock rejected for order {order_id}: {source}")]
  Stock {
    order_id: Uuid,
    #[source]
    source: StockError,
  },

  #[error("Collaborator '{collaborator}' failed. Source: {source}")]
  Collaborator {
    collaborator: &'static str,
    #[source]
    source: AnyhowError,
  },
}

impl CheckoutError {
  pub(crate) fn missing(step_name: &str, what: &str) -> Self {
    CheckoutError::MissingState {
      step_name: step_name.to_string(),
      what: what.to_string(),
    }
  }
}

pub type FlowResult<T, E = FlowError> = std::result::Result<T, E>;
