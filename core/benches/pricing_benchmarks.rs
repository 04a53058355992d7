use cashbak::{
  Event, FixedClock, InMemoryCatalog, InMemoryStockLedger, PriceBasis, PricingConfig, PricingEngine, Product, Quote,
  StockLedger, StockRequest,
};
use chrono::{NaiveDate, NaiveDateTime};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::runtime::Runtime;

fn at(day: u32, hour: u32) -> NaiveDateTime {
  NaiveDate::from_ymd_opt(2024, 7, day)
    .and_then(|d| d.and_hms_opt(hour, 0, 0))
    .unwrap()
}

/// `num_events` events, half of them already expired, over four categories.
fn build_catalog(num_events: usize) -> InMemoryCatalog {
  let mut catalog = InMemoryCatalog::default();
  for i in 0..num_events {
    let ends_at = if i % 2 == 0 { at(20, 18) } else { at(10, 18) };
    let odds = 1.0 + (i % 40) as f64 * 0.1;
    catalog = catalog.with_event(Event::new(i as i64, format!("event_{i}"), odds, ends_at));
  }
  for category in 0..4 {
    for j in 0..5 {
      catalog = catalog.with_product(Product {
        id: i64::from(category * 10 + j),
        name: format!("product_{category}_{j}"),
        description: None,
        price: 15000 + i64::from(j) * 2500,
        cost: 6000 + i64::from(j) * 1000,
        category,
        stock: BTreeMap::from([("M".to_string(), u32::MAX)]),
      });
    }
  }
  catalog
}

fn bench_quote_formula(c: &mut Criterion) {
  let mut group = c.benchmark_group("QuoteFormula");
  let config = PricingConfig::default();
  let basis = PriceBasis::new(29990, 12000);

  for print in [false, true] {
    group.bench_with_input(BenchmarkId::new("compute", if print { "print" } else { "plain" }), &print, |b, &print| {
      b.iter(|| Quote::compute(black_box(1.35), black_box(basis), print, &config))
    });
  }
  group.finish();
}

fn bench_max_cashback(c: &mut Criterion) {
  let mut group = c.benchmark_group("MaxCashbackForCategory");
  let config = PricingConfig::default();
  let clock = FixedClock::at_local(config.reference_zone, at(15, 12)).unwrap();

  for num_events in [10usize, 100, 1000] {
    let catalog = build_catalog(num_events);
    let engine = PricingEngine::new(&config, &catalog, &catalog, &clock);

    group.throughput(Throughput::Elements(num_events as u64));
    group.bench_with_input(BenchmarkId::from_parameter(num_events), &num_events, |b, _| {
      b.iter(|| engine.max_cashback_for_category(black_box(2)))
    });
  }
  group.finish();
}

fn bench_stock_reservation(c: &mut Criterion) {
  let mut group = c.benchmark_group("StockReservation");
  let rt = Runtime::new().unwrap();
  let catalog = build_catalog(0);
  let ledger = Arc::new(InMemoryStockLedger::from_products(catalog.products()));

  for num_lines in [1usize, 5, 20] {
    let requests: Vec<StockRequest> = (0..num_lines)
      .map(|i| StockRequest::new((i % 4) as i64 * 10 + (i % 5) as i64, "M", 1))
      .collect();

    group.throughput(Throughput::Elements(num_lines as u64));
    group.bench_with_input(BenchmarkId::from_parameter(num_lines), &requests, |b, requests| {
      b.to_async(&rt).iter(|| {
        let ledger = ledger.clone();
        async move {
          // Levels are large enough that a rejection here is a bug.
          ledger.reserve(requests).await.unwrap()
        }
      });
    });
  }
  group.finish();
}

criterion_group!(benches, bench_quote_formula, bench_max_cashback, bench_stock_reservation);
criterion_main!(benches);
