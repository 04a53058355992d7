// cashbak/storefront/src/models/mod.rs

//! Row types as stored in Postgres, and their conversions into the core
//! domain records the pricing engine and checkout flow work on.

pub mod cart_item;
pub mod event;
pub mod order;
pub mod product;

pub use cart_item::CartItemRow;
pub use event::EventRow;
pub use order::{OrderItemRow, OrderRow, OrderStatusDb};
pub use product::ProductRow;

use crate::errors::AppError;

/// Narrows a signed column value into the unsigned type the core uses.
pub(crate) fn narrow<S, T>(value: S, column: &str) -> Result<T, AppError>
where
  S: Copy + std::fmt::Display,
  T: TryFrom<S>,
{
  T::try_from(value).map_err(|_| AppError::Internal(format!("Column '{}' holds out-of-range value {}", column, value)))
}
