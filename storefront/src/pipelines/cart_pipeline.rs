// cashbak/storefront/src/pipelines/cart_pipeline.rs

use crate::db;
use crate::errors::AppError;
use crate::models::CartItemRow;
use crate::state::AppState;
use cashbak::{CartLineItem, Flow, FlowContext, FlowError, InMemoryCatalog, Product, Quote, StepControl};
use tracing::{info, warn};
use uuid::Uuid;

pub type AddToCartFlow = Flow<AddToCartCtxData, AppError>;

/// Shared state for one add-to-cart request.
#[derive(Clone)]
pub struct AddToCartCtxData {
  pub app_state: AppState,
  pub user_id: Uuid,
  pub product_id: i64,
  pub size: String,
  pub quantity: i32,
  pub event_id: i64,
  pub print: bool,

  // Filled in by the steps.
  pub product: Option<Product>,
  pub quote: Option<Quote>,
  pub cart_item: Option<CartItemRow>,
}

impl AddToCartCtxData {
  pub fn new(
    app_state: AppState,
    user_id: Uuid,
    product_id: i64,
    size: impl Into<String>,
    quantity: i32,
    event_id: i64,
    print: bool,
  ) -> Self {
    Self {
      app_state,
      user_id,
      product_id,
      size: size.into(),
      quantity,
      event_id,
      print,
      product: None,
      quote: None,
      cart_item: None,
    }
  }
}

fn missing(step: &str, what: &str) -> AppError {
  AppError::Internal(format!("Add to cart: '{}' not set before step '{}'.", what, step))
}

pub fn build_add_to_cart_pipeline() -> Result<AddToCartFlow, FlowError> {
  let mut p = AddToCartFlow::new(
    "add_to_cart",
    &[
      ("validate_cart_input", false),
      ("fetch_product_for_cart", false),
      ("check_size_stock_for_cart", false),
      ("quote_cashback", false),
      ("add_cart_item_db", false),
    ],
  );

  p.on("validate_cart_input", |ctx: FlowContext<AddToCartCtxData>| async move {
    let guard = ctx.read();
    if guard.quantity <= 0 {
      warn!(quantity = guard.quantity, "Add to Cart: quantity must be positive.");
      return Err(AppError::Validation("Quantity must be a positive number.".to_string()));
    }
    if guard.size.trim().is_empty() {
      return Err(AppError::Validation("A size must be selected.".to_string()));
    }
    Ok(StepControl::Continue)
  })?;

  p.on("fetch_product_for_cart", |ctx: FlowContext<AddToCartCtxData>| async move {
    let (product_id, db_pool) = {
      let guard = ctx.read();
      (guard.product_id, guard.app_state.db_pool.clone())
    };

    let product = db::catalog::find_product(&db_pool, product_id)
      .await?
      .ok_or_else(|| AppError::NotFound(format!("Product with ID {} not found.", product_id)))?;
    info!(product_id, price = product.price, category = product.category, "Add to Cart: product found.");
    ctx.write().product = Some(product);
    Ok::<_, AppError>(StepControl::Continue)
  })?;

  // Advisory only: stock is decremented at checkout, where the real check happens.
  p.on("check_size_stock_for_cart", |ctx: FlowContext<AddToCartCtxData>| async move {
    let guard = ctx.read();
    let product = guard
      .product
      .as_ref()
      .ok_or_else(|| missing("check_size_stock_for_cart", "product"))?;
    let requested = u32::try_from(guard.quantity).unwrap_or(0);

    match product.available(&guard.size) {
      None => Err(AppError::Validation(format!(
        "Size '{}' is not offered for product {}.",
        guard.size, product.id
      ))),
      Some(available) if available < requested => {
        warn!(product_id = product.id, size = %guard.size, available, requested, "Add to Cart: not enough stock.");
        Err(AppError::InsufficientStock(format!(
          "Only {} units of size '{}' available.",
          available, guard.size
        )))
      }
      Some(_) => Ok(StepControl::Continue),
    }
  })?;

  p.on("quote_cashback", |ctx: FlowContext<AddToCartCtxData>| async move {
    let (event_id, product, print, app_state) = {
      let guard = ctx.read();
      let product = guard.product.clone().ok_or_else(|| missing("quote_cashback", "product"))?;
      (guard.event_id, product, guard.print, guard.app_state.clone())
    };

    let event = db::catalog::find_event(&app_state.db_pool, event_id).await?;
    let catalog = InMemoryCatalog::new(event.into_iter().collect(), Vec::new());
    let engine = app_state.engine(&catalog);

    // Lines can only be quoted against an event that is still open.
    let quote = {
      let Some(event) = engine.selectable_event(event_id) else {
        warn!(event_id, "Add to Cart: event is closed or unknown.");
        return Err(AppError::Validation(format!(
          "Event {} is not open for selection.",
          event_id
        )));
      };
      engine.quote_for(Some(event), product.basis(), print)
    };

    info!(event_id, percent = quote.percent, stake = quote.stake_amount, "Add to Cart: cashback quoted.");
    ctx.write().quote = Some(quote);
    Ok(StepControl::Continue)
  })?;

  p.on("add_cart_item_db", |ctx: FlowContext<AddToCartCtxData>| async move {
    let (user_id, line, db_pool) = {
      let guard = ctx.read();
      let product = guard.product.as_ref().ok_or_else(|| missing("add_cart_item_db", "product"))?;
      let quote = guard.quote.as_ref().ok_or_else(|| missing("add_cart_item_db", "quote"))?;
      let quantity = u32::try_from(guard.quantity)
        .map_err(|_| AppError::Validation("Quantity must be a positive number.".to_string()))?;
      (
        guard.user_id,
        CartLineItem::from_quote(product, guard.size.clone(), quantity, guard.event_id, quote),
        guard.app_state.db_pool.clone(),
      )
    };

    let row = db::cart::add_cart_item(&db_pool, user_id, &line).await?;
    info!(%user_id, cart_item_id = %row.id, "Add to Cart: line stored.");
    ctx.write().cart_item = Some(row);
    Ok::<_, AppError>(StepControl::Continue)
  })?;

  Ok(p)
}
