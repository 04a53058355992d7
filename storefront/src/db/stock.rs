// cashbak/storefront/src/db/stock.rs

use async_trait::async_trait;
use cashbak::inventory::merge_requests;
use cashbak::{StockError, StockLedger, StockRequest};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, instrument, warn};

/// `StockLedger` over the `products.stock` JSONB column.
///
/// Each line is a conditional `UPDATE ... WHERE units >= requested`. All lines
/// run in one transaction; the first line that matches no row rolls back
/// every decrement already made.
#[derive(Clone)]
pub struct PgStockLedger {
  pool: PgPool,
}

impl PgStockLedger {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

fn backend(err: sqlx::Error) -> StockError {
  StockError::Backend(err.to_string())
}

async fn units_of(
  tx: &mut Transaction<'_, Postgres>,
  product_id: i64,
  size: &str,
) -> Result<Option<Option<i64>>, StockError> {
  let row: Option<(Option<i64>,)> = sqlx::query_as("SELECT (stock ->> $2)::bigint FROM products WHERE id = $1")
    .bind(product_id)
    .bind(size)
    .fetch_optional(&mut **tx)
    .await
    .map_err(backend)?;
  Ok(row.map(|(units,)| units))
}

/// Explains why a conditional decrement matched no row.
async fn classify_rejection(tx: &mut Transaction<'_, Postgres>, request: &StockRequest) -> StockError {
  match units_of(tx, request.product_id, &request.size).await {
    Err(e) => e,
    Ok(None) => StockError::UnknownProduct {
      product_id: request.product_id,
    },
    Ok(Some(None)) => StockError::UnknownSize {
      product_id: request.product_id,
      size: request.size.clone(),
    },
    Ok(Some(Some(units))) => StockError::InsufficientStock {
      product_id: request.product_id,
      size: request.size.clone(),
      available: u32::try_from(units.max(0)).unwrap_or(u32::MAX),
      requested: request.quantity,
    },
  }
}

#[async_trait]
impl StockLedger for PgStockLedger {
  #[instrument(name = "PgStockLedger::reserve", skip_all, fields(lines = requests.len()), err(Display))]
  async fn reserve(&self, requests: &[StockRequest]) -> Result<(), StockError> {
    let merged = merge_requests(requests)?;
    let mut tx = self.pool.begin().await.map_err(backend)?;

    for request in &merged {
      let result = sqlx::query(
        "UPDATE products \
         SET stock = jsonb_set(stock, ARRAY[$2::text], to_jsonb((stock ->> $2)::bigint - $3)) \
         WHERE id = $1 AND stock ? $2 AND (stock ->> $2)::bigint >= $3",
      )
      .bind(request.product_id)
      .bind(&request.size)
      .bind(i64::from(request.quantity))
      .execute(&mut *tx)
      .await
      .map_err(backend)?;

      if result.rows_affected() != 1 {
        let rejection = classify_rejection(&mut tx, request).await;
        warn!(product_id = request.product_id, size = %request.size, error = %rejection, "Reservation rejected.");
        // Undo the lines already decremented.
        tx.rollback().await.map_err(backend)?;
        return Err(rejection);
      }
    }

    tx.commit().await.map_err(backend)?;
    debug!("Reservation committed.");
    Ok(())
  }

  async fn available(&self, product_id: i64, size: &str) -> Result<u32, StockError> {
    let mut tx = self.pool.begin().await.map_err(backend)?;
    let units = units_of(&mut tx, product_id, size).await?;
    tx.commit().await.map_err(backend)?;
    match units {
      None => Err(StockError::UnknownProduct { product_id }),
      Some(None) => Err(StockError::UnknownSize {
        product_id,
        size: size.to_string(),
      }),
      Some(Some(units)) => Ok(u32::try_from(units.max(0)).unwrap_or(u32::MAX)),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use futures_util::future::join_all;

  async fn insert_product(pool: &PgPool, stock: &str) -> i64 {
    let (id,): (i64,) = sqlx::query_as(
      "INSERT INTO products (name, price, cost, category, stock) VALUES ('Tee', 20000, 5000, 1, $1::jsonb) RETURNING id",
    )
    .bind(stock)
    .fetch_one(pool)
    .await
    .expect("insert product");
    id
  }

  #[sqlx::test]
  #[ignore = "needs DATABASE_URL pointing at a Postgres server"]
  async fn concurrent_reservations_never_oversell(pool: PgPool) {
    let product_id = insert_product(&pool, r#"{"M": 3}"#).await;
    let ledger = PgStockLedger::new(pool);

    let attempts = (0..5).map(|_| {
      let ledger = ledger.clone();
      async move { ledger.reserve(&[StockRequest::new(product_id, "M", 1)]).await }
    });
    let results = join_all(attempts).await;

    let reserved = results.iter().filter(|r| r.is_ok()).count();
    let rejected = results
      .iter()
      .filter(|r| matches!(r, Err(StockError::InsufficientStock { .. })))
      .count();
    assert_eq!(reserved, 3);
    assert_eq!(rejected, 2);
    assert_eq!(ledger.available(product_id, "M").await.expect("available"), 0);
  }

  #[sqlx::test]
  #[ignore = "needs DATABASE_URL pointing at a Postgres server"]
  async fn rejected_line_rolls_back_earlier_lines(pool: PgPool) {
    let product_id = insert_product(&pool, r#"{"M": 2, "L": 1}"#).await;
    let ledger = PgStockLedger::new(pool);

    let err = ledger
      .reserve(&[StockRequest::new(product_id, "M", 2), StockRequest::new(product_id, "L", 2)])
      .await
      .expect_err("L is short");
    assert!(matches!(err, StockError::InsufficientStock { available: 1, requested: 2, .. }));
    assert_eq!(ledger.available(product_id, "M").await.expect("available"), 2);
    assert_eq!(ledger.available(product_id, "L").await.expect("available"), 1);
  }
}
