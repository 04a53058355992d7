// tests/common/mod.rs
#![allow(dead_code)] // Not every test binary uses every fixture

use anyhow::anyhow;
use async_trait::async_trait;
use cashbak::{
  CartLineItem, Event, FixedClock, InMemoryCatalog, Notifier, Order, OrderStatus, OrderStore, PaymentConfirmation,
  PaymentGateway, PaymentRedirect, PaymentRequest, PricingConfig, PricingEngine, Product,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::Level;
use uuid::Uuid;

// --- Tracing, initialized once per test binary ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

// --- Time and catalog fixtures ---

pub fn local(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
  NaiveDate::from_ymd_opt(year, month, day)
    .and_then(|d| d.and_hms_opt(hour, minute, 0))
    .expect("valid fixture date")
}

/// "Now" for most tests: 2024-07-15 12:00 in Santiago.
pub fn now_local() -> NaiveDateTime {
  local(2024, 7, 15, 12, 0)
}

pub const SANTIAGO: Tz = chrono_tz::America::Santiago;

pub fn santiago_clock(at: NaiveDateTime) -> FixedClock {
  FixedClock::at_local(SANTIAGO, at).expect("local time exists in Santiago")
}

/// The instant a Santiago wall-clock time denotes.
pub fn santiago_instant(at: NaiveDateTime) -> DateTime<Utc> {
  santiago_clock(at).0
}

pub fn product(id: i64, price: i64, cost: i64, category: i32, stock: &[(&str, u32)]) -> Product {
  Product {
    id,
    name: format!("Product {id}"),
    description: None,
    price,
    cost,
    category,
    stock: stock
      .iter()
      .map(|(size, units)| (size.to_string(), *units))
      .collect::<BTreeMap<_, _>>(),
  }
}

pub fn event(id: i64, odds: f64, ends_at: NaiveDateTime) -> Event {
  Event::new(id, format!("Event {id}"), odds, ends_at)
}

/// Three open events, one expired event, and two categories.
pub fn sample_catalog() -> InMemoryCatalog {
  let tomorrow = local(2024, 7, 16, 20, 0);
  InMemoryCatalog::default()
    .with_event(event(1, 3.55, tomorrow))
    .with_event(event(2, 1.2, tomorrow))
    .with_event(event(3, 1.05, tomorrow))
    .with_event(event(4, 7.3, local(2024, 7, 15, 11, 59)))
    .with_product(product(10, 29990, 12000, 1, &[("M", 5), ("L", 2)]))
    .with_product(product(11, 15000, 9000, 1, &[("M", 1)]))
    .with_product(product(20, 20000, 5000, 2, &[("S", 3)]))
}

pub fn with_engine<R>(catalog: &InMemoryCatalog, at: NaiveDateTime, f: impl FnOnce(&PricingEngine<'_>) -> R) -> R {
  let config = PricingConfig::default();
  let clock = santiago_clock(at);
  let engine = PricingEngine::new(&config, catalog, catalog, &clock);
  f(&engine)
}

pub fn line(product: &Product, size: &str, quantity: u32, event_id: i64, percent: u8) -> CartLineItem {
  CartLineItem {
    product_id: product.id,
    product_name: product.name.clone(),
    size: size.to_string(),
    quantity,
    print: false,
    unit_price: product.price,
    event_id,
    cashback_percent: percent,
    stake_amount: 0.0,
  }
}

// --- Collaborator doubles ---

/// Ordered log of every collaborator call, shared by the doubles below.
pub type CallLog = Arc<Mutex<Vec<String>>>;

#[derive(Default)]
pub struct RecordingOrderStore {
  pub calls: CallLog,
  pub orders: Mutex<HashMap<Uuid, Order>>,
  pub failure_reasons: Mutex<HashMap<Uuid, String>>,
  pub fail_create: bool,
}

impl RecordingOrderStore {
  pub fn new(calls: CallLog) -> Self {
    Self {
      calls,
      ..Default::default()
    }
  }

  pub fn status_of(&self, order_id: Uuid) -> Option<OrderStatus> {
    self.orders.lock().get(&order_id).map(|o| o.status)
  }
}

#[async_trait]
impl OrderStore for RecordingOrderStore {
  async fn create_order(&self, order: &Order) -> anyhow::Result<()> {
    self.calls.lock().push("create_order".into());
    if self.fail_create {
      return Err(anyhow!("database unavailable"));
    }
    self.orders.lock().insert(order.id, order.clone());
    Ok(())
  }

  async fn mark_paid(&self, order_id: Uuid, authorization_code: Option<&str>) -> anyhow::Result<()> {
    self.calls.lock().push("mark_paid".into());
    let mut orders = self.orders.lock();
    let order = orders.get_mut(&order_id).ok_or_else(|| anyhow!("unknown order {order_id}"))?;
    order.status = OrderStatus::Paid;
    order.authorization_code = authorization_code.map(str::to_string);
    Ok(())
  }

  async fn mark_failed(&self, order_id: Uuid, reason: &str) -> anyhow::Result<()> {
    self.calls.lock().push("mark_failed".into());
    if let Some(order) = self.orders.lock().get_mut(&order_id) {
      order.status = OrderStatus::Failed;
    }
    self.failure_reasons.lock().insert(order_id, reason.to_string());
    Ok(())
  }
}

/// Gateway double. Commits authorize `amount` unless told otherwise.
pub struct ScriptedGateway {
  pub calls: CallLog,
  pub authorize: bool,
  pub amount: i64,
  pub fail_commit: bool,
}

impl ScriptedGateway {
  pub fn approving(calls: CallLog, amount: i64) -> Self {
    Self {
      calls,
      authorize: true,
      amount,
      fail_commit: false,
    }
  }
}

#[async_trait]
impl PaymentGateway for ScriptedGateway {
  async fn create(&self, request: &PaymentRequest) -> anyhow::Result<PaymentRedirect> {
    self.calls.lock().push("create_transaction".into());
    Ok(PaymentRedirect {
      token: format!("tok-{}", request.buy_order),
      url: "https://gateway.test/pay".into(),
    })
  }

  async fn commit(&self, token: &str) -> anyhow::Result<PaymentConfirmation> {
    self.calls.lock().push("commit".into());
    if self.fail_commit {
      return Err(anyhow!("gateway timeout"));
    }
    Ok(PaymentConfirmation {
      token: token.to_string(),
      buy_order: "bo-1".into(),
      amount: self.amount,
      authorized: self.authorize,
      response_code: if self.authorize { 0 } else { -1 },
      authorization_code: self.authorize.then(|| "AUTH123".to_string()),
    })
  }
}

#[derive(Default)]
pub struct RecordingNotifier {
  pub calls: CallLog,
  pub sent_to: Mutex<Vec<String>>,
  pub fail: bool,
}

impl RecordingNotifier {
  pub fn new(calls: CallLog) -> Self {
    Self {
      calls,
      ..Default::default()
    }
  }
}

#[async_trait]
impl Notifier for RecordingNotifier {
  async fn send_order_confirmation(&self, order: &Order) -> anyhow::Result<String> {
    self.calls.lock().push("send_confirmation".into());
    if self.fail {
      return Err(anyhow!("smtp refused"));
    }
    self.sent_to.lock().push(order.buyer_email.clone());
    Ok(format!("msg-{}", order.id))
  }
}
