// cashbak/storefront/src/db/seed.rs

use crate::errors::Result as AppResult;
use chrono::{Duration, NaiveDateTime};
use serde_json::json;
use sqlx::PgPool;
use tracing::{info, instrument};

struct SeedProduct {
  name: &'static str,
  description: &'static str,
  price: i64,
  cost: i64,
  category: i32,
  stock: serde_json::Value,
}

/// Inserts a small demo catalog when the tables are empty. Event end times are
/// placed relative to `now` (reference-zone wall clock) so some are open.
#[instrument(name = "db::seed_db", skip(pool), err(Display))]
pub async fn seed_db(pool: &PgPool, now: NaiveDateTime) -> AppResult<()> {
  let (existing,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products").fetch_one(pool).await?;
  if existing > 0 {
    info!(existing, "Catalog already populated; skipping seed.");
    return Ok(());
  }

  let products = [
    SeedProduct {
      name: "Camiseta Local 2024",
      description: "Home jersey, breathable fabric.",
      price: 29990,
      cost: 12000,
      category: 1,
      stock: json!({"S": 10, "M": 15, "L": 12, "XL": 6}),
    },
    SeedProduct {
      name: "Camiseta Visita 2024",
      description: "Away jersey.",
      price: 27990,
      cost: 11500,
      category: 1,
      stock: json!({"S": 8, "M": 10, "L": 8}),
    },
    SeedProduct {
      name: "Polerón Hincha",
      description: "Hoodie with club crest.",
      price: 20000,
      cost: 5000,
      category: 2,
      stock: json!({"M": 5, "L": 5}),
    },
    SeedProduct {
      name: "Jockey Oficial",
      description: "Adjustable cap.",
      price: 15000,
      cost: 9000,
      category: 3,
      stock: json!({"U": 30}),
    },
  ];

  let mut tx = pool.begin().await?;
  for product in &products {
    sqlx::query("INSERT INTO products (name, description, price, cost, category, stock) VALUES ($1, $2, $3, $4, $5, $6)")
      .bind(product.name)
      .bind(product.description)
      .bind(product.price)
      .bind(product.cost)
      .bind(product.category)
      .bind(&product.stock)
      .execute(&mut *tx)
      .await?;
  }

  let events = [
    ("Colo-Colo gana el Superclásico", 3.55, now + Duration::days(2)),
    ("Chile anota primero ante Perú", 1.2, now + Duration::days(5)),
    ("Más de 2.5 goles en la final", 1.05, now + Duration::days(7)),
    ("U. de Chile gana la Copa", 7.3, now - Duration::days(1)),
  ];
  for (name, odds, ends_at) in events {
    sqlx::query("INSERT INTO events (name, odds, ends_at) VALUES ($1, $2, $3)")
      .bind(name)
      .bind(odds)
      .bind(ends_at)
      .execute(&mut *tx)
      .await?;
  }
  tx.commit().await?;

  info!(products = products.len(), events = events.len(), "Seeded demo catalog.");
  Ok(())
}
