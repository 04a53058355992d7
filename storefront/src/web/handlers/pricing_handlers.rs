// cashbak/storefront/src/web/handlers/pricing_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};

use crate::db;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Deserialize, Debug)]
pub struct QuoteQuery {
  pub event_id: i64,
  pub category: i32,
  #[serde(default)]
  pub print: bool,
}

/// Quote for an event against a category's representative product. Closed or
/// unknown events, and categories without products, quote zero rather than failing.
#[instrument(name = "handler::quote", skip(app_state))]
pub async fn quote_handler(
  app_state: web::Data<AppState>,
  query: web::Query<QuoteQuery>,
) -> Result<HttpResponse, AppError> {
  let catalog = db::catalog::load_catalog(&app_state.db_pool).await?;
  let engine = app_state.engine(&catalog);
  let selectable = engine.selectable_event(query.event_id).is_some();

  let body = match engine.quote(query.event_id, query.category, query.print) {
    Some(quote) => json!({
      "eventId": query.event_id,
      "category": query.category,
      "print": query.print,
      "eventOpen": selectable,
      "cashbackPercent": quote.percent,
      "stakeAmount": quote.stake_amount,
      "price": quote.basis.price,
      "cost": quote.basis.cost,
      "marginRate": quote.margin_rate,
    }),
    None => {
      debug!(category = query.category, "No products in category; quoting zero.");
      zero_quote_body(&query, selectable)
    }
  };
  Ok(HttpResponse::Ok().json(body))
}

fn zero_quote_body(query: &QuoteQuery, event_open: bool) -> serde_json::Value {
  json!({
    "eventId": query.event_id,
    "category": query.category,
    "print": query.print,
    "eventOpen": event_open,
    "cashbackPercent": 0,
    "stakeAmount": 0.0,
    "price": null,
    "cost": null,
    "marginRate": null,
  })
}
