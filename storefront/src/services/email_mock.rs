// cashbak/storefront/src/services/email_mock.rs
use crate::errors::{AppError, Result as AppResult};
use async_trait::async_trait;
use cashbak::{Notifier, Order};
use tracing::{info, instrument, warn};

#[derive(Debug)]
pub struct SentEmailInfo {
  pub to: String,
  pub from: String,
  pub subject: String,
  pub body_preview: String, // First N chars of body
  pub message_id: String,
}

/// Recipients at this domain always bounce, for exercising failure paths.
pub const FAILING_DOMAIN: &str = "fail.test";

pub async fn send_mock_email(to: &str, from: &str, subject: &str, html_body: &str) -> AppResult<SentEmailInfo> {
  info!(to, from, subject, "Simulating sending email.");
  tokio::time::sleep(std::time::Duration::from_millis(20)).await; // Simulate network latency

  if to.trim().to_lowercase().ends_with(&format!("@{FAILING_DOMAIN}")) {
    warn!(to, "Simulated email failure for recipient.");
    return Err(AppError::Internal("Simulated email send failure".to_string()));
  }

  let body_preview = html_body.chars().take(50).collect::<String>() + "...";
  let message_id = format!("mock_email_{}", uuid::Uuid::new_v4());
  info!(%message_id, "Mock email sent successfully.");

  Ok(SentEmailInfo {
    to: to.to_string(),
    from: from.to_string(),
    subject: subject.to_string(),
    body_preview,
    message_id,
  })
}

fn confirmation_body(order: &Order) -> String {
  let mut body = format!(
    "<h1>Thanks for your purchase!</h1><p>Order {} total: {} {}</p><ul>",
    order.id, order.total_amount, order.currency
  );
  for item in &order.items {
    body.push_str(&format!(
      "<li>{} x product #{} ({}) - {}% cashback if event #{} wins</li>",
      item.quantity, item.product_id, item.size, item.cashback_percentage, item.event_id
    ));
  }
  body.push_str("</ul>");
  body
}

/// Order confirmations through the mock mailer.
#[derive(Debug, Clone)]
pub struct MockEmailNotifier {
  sender: String,
}

impl MockEmailNotifier {
  pub fn new(sender: impl Into<String>) -> Self {
    Self { sender: sender.into() }
  }
}

#[async_trait]
impl Notifier for MockEmailNotifier {
  #[instrument(name = "MockEmailNotifier::send_order_confirmation", skip(self, order), fields(order_id = %order.id), err(Display))]
  async fn send_order_confirmation(&self, order: &Order) -> anyhow::Result<String> {
    let subject = format!("Your CashBak order {}", order.id);
    let sent = send_mock_email(&order.buyer_email, &self.sender, &subject, &confirmation_body(order))
      .await
      .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    Ok(sent.message_id)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use uuid::Uuid;

  fn order(email: &str) -> Order {
    Order::snapshot(Uuid::new_v4(), email, "CLP", "tok", &[])
  }

  #[tokio::test]
  async fn confirmation_returns_message_id() {
    let notifier = MockEmailNotifier::new("noreply@cashbak.cl");
    let id = notifier.send_order_confirmation(&order("buyer@example.com")).await.unwrap();
    assert!(id.starts_with("mock_email_"));
  }

  #[tokio::test]
  async fn failing_domain_bounces() {
    let notifier = MockEmailNotifier::new("noreply@cashbak.cl");
    let err = notifier.send_order_confirmation(&order("someone@FAIL.test")).await.unwrap_err();
    assert!(err.to_string().contains("Simulated email send failure"));
  }
}
