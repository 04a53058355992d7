// cashbak/storefront/src/db/catalog.rs

use crate::errors::{AppError, Result as AppResult};
use crate::models::product::PRODUCT_COLUMNS;
use crate::models::{EventRow, ProductRow};
use cashbak::{Event, EventOutcome, InMemoryCatalog, Product};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use sqlx::PgPool;
use tracing::{info, instrument, warn};

const EVENT_COLUMNS: &str = "id, name, odds, ends_at, is_winner";

#[instrument(name = "db::load_events", skip(pool), err(Display))]
pub async fn load_events(pool: &PgPool) -> AppResult<Vec<Event>> {
  let rows: Vec<EventRow> = sqlx::query_as(&format!("SELECT {EVENT_COLUMNS} FROM events ORDER BY ends_at ASC, id ASC"))
    .fetch_all(pool)
    .await?;
  Ok(rows.into_iter().map(Event::from).collect())
}

pub async fn find_event(pool: &PgPool, event_id: i64) -> AppResult<Option<Event>> {
  let row: Option<EventRow> = sqlx::query_as(&format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"))
    .bind(event_id)
    .fetch_optional(pool)
    .await?;
  Ok(row.map(Event::from))
}

#[instrument(name = "db::load_products", skip(pool), err(Display))]
pub async fn load_products(pool: &PgPool) -> AppResult<Vec<Product>> {
  let rows: Vec<ProductRow> = sqlx::query_as(&format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id ASC"))
    .fetch_all(pool)
    .await?;
  rows.into_iter().map(Product::try_from).collect()
}

pub async fn find_product(pool: &PgPool, product_id: i64) -> AppResult<Option<Product>> {
  let row: Option<ProductRow> = sqlx::query_as(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"))
    .bind(product_id)
    .fetch_optional(pool)
    .await?;
  row.map(Product::try_from).transpose()
}

/// Snapshot of events and products for one request's pricing queries.
pub async fn load_catalog(pool: &PgPool) -> AppResult<InMemoryCatalog> {
  let events = load_events(pool).await?;
  let products = load_products(pool).await?;
  Ok(InMemoryCatalog::new(events, products))
}

/// Marks an event won or lost. The event's local end time is read in `zone`
/// and must be at or before `now`.
///
/// The update only applies to an unresolved row, so two concurrent calls
/// cannot both succeed.
#[instrument(name = "db::resolve_event", skip(pool), err(Display))]
pub async fn resolve_event(pool: &PgPool, event_id: i64, won: bool, zone: Tz, now: DateTime<Utc>) -> AppResult<Event> {
  let mut event = find_event(pool, event_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Event {} not found.", event_id)))?;

  let outcome = event.resolve(won, zone, now)?;

  let updated = sqlx::query("UPDATE events SET is_winner = $2 WHERE id = $1 AND is_winner IS NULL")
    .bind(event_id)
    .bind(outcome.as_flag())
    .execute(pool)
    .await?;

  if updated.rows_affected() != 1 {
    warn!(event_id, "Event was resolved concurrently.");
    return Err(AppError::Conflict(format!("Event {} was already resolved.", event_id)));
  }

  info!(event_id, won = outcome == EventOutcome::Won, "Event outcome stored.");
  Ok(event)
}
