// cashbak/storefront/src/services/webpay_mock.rs

//! In-process stand-in for a Webpay-style redirect gateway: `create` hands out
//! a token and a URL, `commit` settles the token once.

use async_trait::async_trait;
use cashbak::{PaymentConfirmation, PaymentGateway, PaymentRedirect, PaymentRequest};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{info, instrument, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
struct PendingTransaction {
  buy_order: String,
  amount: i64,
}

#[derive(Debug)]
pub struct MockWebpay {
  base_url: String,
  commerce_code: String,
  latency: Duration,
  transactions: Mutex<HashMap<String, PendingTransaction>>,
}

impl MockWebpay {
  pub fn new(base_url: impl Into<String>, commerce_code: impl Into<String>, latency: Duration) -> Self {
    Self {
      base_url: base_url.into(),
      commerce_code: commerce_code.into(),
      latency,
      transactions: Mutex::new(HashMap::new()),
    }
  }

  pub fn pending_count(&self) -> usize {
    self.transactions.lock().len()
  }

  async fn simulate_latency(&self) {
    if !self.latency.is_zero() {
      tokio::time::sleep(self.latency).await;
    }
  }
}

/// Amounts ending in 123 (mod 1000) are declined, the rest approved.
fn is_declined(amount: i64) -> bool {
  amount.rem_euclid(1000) == 123
}

#[async_trait]
impl PaymentGateway for MockWebpay {
  #[instrument(name = "MockWebpay::create", skip(self, request), fields(buy_order = %request.buy_order, amount = request.amount), err(Display))]
  async fn create(&self, request: &PaymentRequest) -> anyhow::Result<PaymentRedirect> {
    if request.amount <= 0 {
      anyhow::bail!("transaction amount must be positive, got {}", request.amount);
    }
    self.simulate_latency().await;

    let token = format!("mock_ws_{}", Uuid::new_v4().simple());
    self.transactions.lock().insert(
      token.clone(),
      PendingTransaction {
        buy_order: request.buy_order.clone(),
        amount: request.amount,
      },
    );
    info!(commerce_code = %self.commerce_code, pending = self.pending_count(), "Mock Webpay transaction created.");

    Ok(PaymentRedirect {
      url: format!("{}/webpay/pay?token_ws={}", self.base_url.trim_end_matches('/'), token),
      token,
    })
  }

  #[instrument(name = "MockWebpay::commit", skip(self), err(Display))]
  async fn commit(&self, token: &str) -> anyhow::Result<PaymentConfirmation> {
    self.simulate_latency().await;
    let Some(pending) = self.transactions.lock().remove(token) else {
      anyhow::bail!("unknown or already committed token '{}'", token);
    };

    let authorized = !is_declined(pending.amount);
    let authorization_code = authorized.then(|| format!("{:06}", Uuid::new_v4().as_u128() % 1_000_000));
    if authorized {
      info!(buy_order = %pending.buy_order, "Mock Webpay transaction authorized.");
    } else {
      warn!(buy_order = %pending.buy_order, "Mock Webpay transaction rejected.");
    }

    Ok(PaymentConfirmation {
      token: token.to_string(),
      buy_order: pending.buy_order,
      amount: pending.amount,
      authorized,
      response_code: if authorized { 0 } else { -1 },
      authorization_code,
    })
  }
}
