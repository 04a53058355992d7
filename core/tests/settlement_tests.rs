// tests/settlement_tests.rs
mod common;

use cashbak::{order_payouts, realized_payout, EventOutcome, InMemoryCatalog, Order, Payout, SettlementError};
use common::*;
use uuid::Uuid;

fn sample_order() -> Order {
  let shirt = product(10, 29990, 12000, 1, &[("M", 5)]);
  let mug = product(20, 20000, 5000, 2, &[("S", 3)]);
  Order::snapshot(
    Uuid::new_v4(),
    "buyer@example.com",
    "CLP",
    "tok-1",
    &[line(&shirt, "M", 2, 1, 100), line(&mug, "S", 1, 2, 78), line(&mug, "S", 3, 3, 68)],
  )
}

#[test]
fn test_event_resolves_once_after_it_ends() {
  setup_tracing();
  let mut ev = event(1, 2.0, local(2024, 7, 15, 20, 0));

  assert_eq!(
    ev.resolve(true, SANTIAGO, santiago_instant(local(2024, 7, 15, 19, 59))),
    Err(SettlementError::NotYetEnded { event_id: 1 })
  );
  assert_eq!(ev.outcome, EventOutcome::Unresolved);

  assert_eq!(ev.resolve(false, SANTIAGO, santiago_instant(local(2024, 7, 15, 20, 0))), Ok(EventOutcome::Lost));
  assert_eq!(
    ev.resolve(true, SANTIAGO, santiago_instant(local(2024, 7, 16, 0, 0))),
    Err(SettlementError::AlreadyResolved { event_id: 1 })
  );
  assert_eq!(ev.outcome, EventOutcome::Lost);
  assert_eq!(ev.outcome.as_flag(), Some(false));
}

#[test]
fn test_realized_payout_uses_locked_percentage() {
  let order = sample_order();
  let item = &order.items[1]; // 1 x 20000 at 78%

  assert_eq!(realized_payout(item, EventOutcome::Unresolved), Payout::Pending);
  assert_eq!(realized_payout(item, EventOutcome::Lost), Payout::Lost);
  assert_eq!(realized_payout(item, EventOutcome::Won), Payout::Won { amount: 15600 });
  assert_eq!(Payout::Lost.amount(), 0);
}

#[test]
fn test_payout_rounds_down() {
  let mut order = sample_order();
  let item = &mut order.items[0];
  item.price_at_purchase = 14995;
  item.quantity = 1;
  item.cashback_percentage = 33;
  // 14995 * 33 / 100 = 4948.35
  assert_eq!(realized_payout(item, EventOutcome::Won), Payout::Won { amount: 4948 });
}

#[test]
fn test_order_payouts_follow_event_outcomes() {
  setup_tracing();
  let order = sample_order();
  let mut won = event(1, 3.55, local(2024, 7, 15, 20, 0));
  let mut lost = event(2, 1.2, local(2024, 7, 15, 20, 0));
  let after_end = local(2024, 7, 15, 22, 0);
  won.resolve(true, SANTIAGO, santiago_instant(after_end)).expect("ended");
  lost.resolve(false, SANTIAGO, santiago_instant(after_end)).expect("ended");
  // Event 3 stays unresolved.
  let catalog = InMemoryCatalog::default()
    .with_event(won)
    .with_event(lost)
    .with_event(event(3, 1.05, local(2024, 7, 20, 0, 0)));

  let payouts = order_payouts(order.id, &order.items, &catalog);

  assert_eq!(payouts.order_id, order.id);
  let statuses: Vec<Payout> = payouts.items.iter().map(|i| i.payout).collect();
  assert_eq!(
    statuses,
    vec![Payout::Won { amount: 59980 }, Payout::Lost, Payout::Pending]
  );
  assert_eq!(payouts.total_won, 59980);
  assert_eq!(payouts.pending_items, 1);
}

#[test]
fn test_unknown_event_is_pending() {
  let order = sample_order();
  let payouts = order_payouts(order.id, &order.items, &InMemoryCatalog::default());
  assert_eq!(payouts.pending_items, 3);
  assert_eq!(payouts.total_won, 0);
}
