// cashbak/storefront/src/db/cart.rs

use crate::errors::Result as AppResult;
use crate::models::{narrow, CartItemRow};
use cashbak::CartLineItem;
use sqlx::{PgExecutor, PgPool};
use tracing::{debug, instrument};
use uuid::Uuid;

/// The user's cart, oldest line first.
pub async fn list_cart_rows(pool: &PgPool, user_id: Uuid) -> AppResult<Vec<CartItemRow>> {
  let rows: Vec<CartItemRow> = sqlx::query_as(
    "SELECT ci.id, ci.user_id, ci.product_id, p.name AS product_name, ci.size, ci.quantity, ci.print, \
       ci.unit_price, ci.event_id, ci.cashback_percent, ci.stake_amount, ci.added_at \
     FROM cart_items ci JOIN products p ON p.id = ci.product_id \
     WHERE ci.user_id = $1 ORDER BY ci.added_at ASC, ci.id ASC",
  )
  .bind(user_id)
  .fetch_all(pool)
  .await?;
  Ok(rows)
}

pub async fn list_cart(pool: &PgPool, user_id: Uuid) -> AppResult<Vec<CartLineItem>> {
  list_cart_rows(pool, user_id)
    .await?
    .into_iter()
    .map(CartLineItem::try_from)
    .collect()
}

/// Stores a new line. Lines are never merged: each keeps the quote it was added with.
#[instrument(name = "db::add_cart_item", skip(pool, line), fields(product_id = line.product_id, event_id = line.event_id), err(Display))]
pub async fn add_cart_item(pool: &PgPool, user_id: Uuid, line: &CartLineItem) -> AppResult<CartItemRow> {
  let item_id = Uuid::new_v4();
  sqlx::query(
    "INSERT INTO cart_items \
       (id, user_id, product_id, size, quantity, print, unit_price, event_id, cashback_percent, stake_amount) \
     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
  )
  .bind(item_id)
  .bind(user_id)
  .bind(line.product_id)
  .bind(&line.size)
  .bind(narrow::<u32, i32>(line.quantity, "cart_items.quantity")?)
  .bind(line.print)
  .bind(line.unit_price)
  .bind(line.event_id)
  .bind(i16::from(line.cashback_percent))
  .bind(line.stake_amount)
  .execute(pool)
  .await?;

  let row: CartItemRow = sqlx::query_as(
    "SELECT ci.id, ci.user_id, ci.product_id, p.name AS product_name, ci.size, ci.quantity, ci.print, \
       ci.unit_price, ci.event_id, ci.cashback_percent, ci.stake_amount, ci.added_at \
     FROM cart_items ci JOIN products p ON p.id = ci.product_id WHERE ci.id = $1",
  )
  .bind(item_id)
  .fetch_one(pool)
  .await?;
  debug!(cart_item_id = %row.id, "Cart item stored.");
  Ok(row)
}

pub async fn clear_cart<'e>(executor: impl PgExecutor<'e>, user_id: Uuid) -> Result<u64, sqlx::Error> {
  let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
    .bind(user_id)
    .execute(executor)
    .await?;
  Ok(result.rows_affected())
}

/// Remembers which buyer a gateway token belongs to until it is committed.
pub async fn save_checkout_session(
  pool: &PgPool,
  token: &str,
  user_id: Uuid,
  buyer_email: &str,
  amount: i64,
) -> AppResult<()> {
  sqlx::query("INSERT INTO checkout_sessions (token, user_id, buyer_email, amount) VALUES ($1, $2, $3, $4)")
    .bind(token)
    .bind(user_id)
    .bind(buyer_email)
    .bind(amount)
    .execute(pool)
    .await?;
  Ok(())
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CheckoutSession {
  pub token: String,
  pub user_id: Uuid,
  pub buyer_email: String,
  pub amount: i64,
}

/// Removes and returns the session, so a token can only be committed once.
pub async fn take_checkout_session(pool: &PgPool, token: &str) -> AppResult<Option<CheckoutSession>> {
  let session: Option<CheckoutSession> = sqlx::query_as(
    "DELETE FROM checkout_sessions WHERE token = $1 RETURNING token, user_id, buyer_email, amount",
  )
  .bind(token)
  .fetch_optional(pool)
  .await?;
  Ok(session)
}
