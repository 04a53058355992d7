// cashbak/src/checkout/collaborators.rs

//! External services the checkout flow drives. Implementations live in the
//! application (database, payment gateway, email provider) or in tests.

use crate::model::Order;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Start of a redirect-style payment: the buyer is sent to `url` with `token`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRequest {
  pub buy_order: String,
  pub session_id: String,
  pub amount: i64,
  pub return_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRedirect {
  pub token: String,
  pub url: String,
}

/// Result of committing a transaction after the buyer returns from the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentConfirmation {
  pub token: String,
  pub buy_order: String,
  pub amount: i64,
  pub authorized: bool,
  /// Gateway response code; 0 means approved.
  pub response_code: i32,
  pub authorization_code: Option<String>,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
  async fn create(&self, request: &PaymentRequest) -> anyhow::Result<PaymentRedirect>;

  async fn commit(&self, token: &str) -> anyhow::Result<PaymentConfirmation>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
  /// Persists the order and its items once.
  async fn create_order(&self, order: &Order) -> anyhow::Result<()>;

  async fn mark_paid(&self, order_id: Uuid, authorization_code: Option<&str>) -> anyhow::Result<()>;

  async fn mark_failed(&self, order_id: Uuid, reason: &str) -> anyhow::Result<()>;
}

#[async_trait]
pub trait Notifier: Send + Sync {
  /// Returns the provider's message id.
  async fn send_order_confirmation(&self, order: &Order) -> anyhow::Result<String>;
}
