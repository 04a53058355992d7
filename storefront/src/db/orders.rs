// cashbak/storefront/src/db/orders.rs

use crate::errors::Result as AppResult;
use crate::models::{OrderItemRow, OrderRow, OrderStatusDb};
use anyhow::{bail, Context};
use async_trait::async_trait;
use cashbak::{Order, OrderItem, OrderStore};
use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;

/// `OrderStore` over the `orders` and `order_items` tables.
#[derive(Clone)]
pub struct PgOrderStore {
  pool: PgPool,
}

impl PgOrderStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl OrderStore for PgOrderStore {
  #[instrument(name = "PgOrderStore::create_order", skip_all, fields(order_id = %order.id, items = order.items.len()), err(Display))]
  async fn create_order(&self, order: &Order) -> anyhow::Result<()> {
    let mut tx = self.pool.begin().await?;

    sqlx::query(
      "INSERT INTO orders (id, user_id, buyer_email, status, total_amount, currency, payment_token, created_at, updated_at) \
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)",
    )
    .bind(order.id)
    .bind(order.user_id)
    .bind(&order.buyer_email)
    .bind(OrderStatusDb::from(order.status))
    .bind(order.total_amount)
    .bind(&order.currency)
    .bind(&order.payment_token)
    .bind(order.created_at)
    .execute(&mut *tx)
    .await
    .context("inserting order")?;

    for item in &order.items {
      sqlx::query(
        "INSERT INTO order_items \
           (id, order_id, product_id, size, quantity, print, price_at_purchase, event_id, cashback_percentage, stake_amount) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
      )
      .bind(item.id)
      .bind(item.order_id)
      .bind(item.product_id)
      .bind(&item.size)
      .bind(i32::try_from(item.quantity).context("order item quantity")?)
      .bind(item.print)
      .bind(item.price_at_purchase)
      .bind(item.event_id)
      .bind(i16::from(item.cashback_percentage))
      .bind(item.stake_amount)
      .execute(&mut *tx)
      .await
      .context("inserting order item")?;
    }

    tx.commit().await?;
    info!("Order persisted.");
    Ok(())
  }

  #[instrument(name = "PgOrderStore::mark_paid", skip(self), err(Display))]
  async fn mark_paid(&self, order_id: Uuid, authorization_code: Option<&str>) -> anyhow::Result<()> {
    let result = sqlx::query(
      "UPDATE orders SET status = $2, authorization_code = $3, updated_at = NOW() WHERE id = $1 AND status = $4",
    )
    .bind(order_id)
    .bind(OrderStatusDb::Paid)
    .bind(authorization_code)
    .bind(OrderStatusDb::Pending)
    .execute(&self.pool)
    .await?;
    if result.rows_affected() != 1 {
      bail!("order {order_id} is not pending");
    }
    Ok(())
  }

  #[instrument(name = "PgOrderStore::mark_failed", skip(self), err(Display))]
  async fn mark_failed(&self, order_id: Uuid, reason: &str) -> anyhow::Result<()> {
    sqlx::query("UPDATE orders SET status = $2, failure_reason = $3, updated_at = NOW() WHERE id = $1")
      .bind(order_id)
      .bind(OrderStatusDb::Failed)
      .bind(reason)
      .execute(&self.pool)
      .await?;
    Ok(())
  }
}

pub async fn find_order(pool: &PgPool, order_id: Uuid) -> AppResult<Option<OrderRow>> {
  let row: Option<OrderRow> = sqlx::query_as(
    "SELECT id, user_id, buyer_email, status, total_amount, currency, payment_token, authorization_code, \
       failure_reason, created_at, updated_at \
     FROM orders WHERE id = $1",
  )
  .bind(order_id)
  .fetch_optional(pool)
  .await?;
  Ok(row)
}

pub async fn order_items(pool: &PgPool, order_id: Uuid) -> AppResult<Vec<OrderItem>> {
  let rows: Vec<OrderItemRow> = sqlx::query_as(
    "SELECT id, order_id, product_id, size, quantity, print, price_at_purchase, event_id, cashback_percentage, \
       stake_amount \
     FROM order_items WHERE order_id = $1 ORDER BY product_id ASC, id ASC",
  )
  .bind(order_id)
  .fetch_all(pool)
  .await?;
  rows.into_iter().map(OrderItem::try_from).collect()
}
