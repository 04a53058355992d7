// cashbak/storefront/src/errors.rs

use actix_web::{HttpResponse, ResponseError};
use cashbak::{CheckoutError, ConfigError, FlowError, SettlementError, StockError};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Authentication Failed: {0}")]
  Auth(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Payment Processing Error: {0}")]
  Payment(String),

  #[error("Insufficient Stock: {0}")]
  InsufficientStock(String),

  #[error("Conflict: {0}")]
  Conflict(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Workflow Error: {source}")]
  Workflow {
    #[from]
    source: FlowError,
  },

  #[error("Internal Server Error: {0}")]
  Internal(String),

  // A flow stopped gracefully, but the request still cannot be served.
  #[error("Pipeline execution was halted by a handler.")]
  PipelineHaltedByHandler,
}

impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    match err.downcast::<sqlx::Error>() {
      Ok(db_err) => AppError::Sqlx(db_err),
      Err(err) => AppError::Internal(format!("{err:#}")),
    }
  }
}

impl From<StockError> for AppError {
  fn from(err: StockError) -> Self {
    match err {
      StockError::InsufficientStock { .. } => AppError::InsufficientStock(err.to_string()),
      StockError::UnknownProduct { .. } | StockError::UnknownSize { .. } => AppError::NotFound(err.to_string()),
      StockError::InvalidQuantity { .. } => AppError::Validation(err.to_string()),
      StockError::Backend(msg) => AppError::Internal(msg),
    }
  }
}

impl From<SettlementError> for AppError {
  fn from(err: SettlementError) -> Self {
    match err {
      SettlementError::AlreadyResolved { .. } => AppError::Conflict(err.to_string()),
      SettlementError::NotYetEnded { .. } => AppError::Validation(err.to_string()),
    }
  }
}

impl From<ConfigError> for AppError {
  fn from(err: ConfigError) -> Self {
    AppError::Config(err.to_string())
  }
}

impl From<CheckoutError> for AppError {
  fn from(err: CheckoutError) -> Self {
    match err {
      CheckoutError::Flow { source } => AppError::Workflow { source },
      CheckoutError::EmptyCart => AppError::Validation("Cart is empty.".to_string()),
      CheckoutError::Stock { source, .. } => source.into(),
      CheckoutError::Collaborator {
        collaborator,
        source,
      } => match source.downcast::<sqlx::Error>() {
        Ok(db_err) => AppError::Sqlx(db_err),
        Err(source) => AppError::Internal(format!("{collaborator} failed: {source:#}")),
      },
      other @ CheckoutError::MissingState { .. } => AppError::Internal(other.to_string()),
    }
  }
}

impl ResponseError for AppError {
  fn error_response(&self) -> HttpResponse {
    tracing::error!(application_error = %self, "Responding with error");
    match self {
      AppError::Validation(m) => HttpResponse::BadRequest().json(json!({"error": m})),
      AppError::Auth(m) => HttpResponse::Unauthorized().json(json!({"error": m})),
      AppError::NotFound(m) => HttpResponse::NotFound().json(json!({"error": m})),
      AppError::Payment(m) => HttpResponse::PaymentRequired().json(json!({"error": m})),
      AppError::InsufficientStock(m) => {
        HttpResponse::Conflict().json(json!({"error": "Insufficient stock", "detail": m}))
      }
      AppError::Conflict(m) => HttpResponse::Conflict().json(json!({"error": m})),
      AppError::Config(m) => {
        HttpResponse::InternalServerError().json(json!({"error": "Configuration issue", "detail": m}))
      }
      AppError::Sqlx(_) => HttpResponse::InternalServerError().json(json!({"error": "Database operation failed"})),
      AppError::Workflow { source } => {
        tracing::error!(flow_error_source = ?source, "Workflow error details");
        HttpResponse::InternalServerError()
          .json(json!({"error": "Workflow processing error", "detail": source.to_string()}))
      }
      AppError::Internal(m) => {
        HttpResponse::InternalServerError().json(json!({"error": "An internal error occurred", "detail": m}))
      }
      AppError::PipelineHaltedByHandler => {
        HttpResponse::Conflict().json(json!({"error": "Process halted as expected by business logic."}))
      }
    }
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
