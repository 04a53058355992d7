// cashbak/src/model/mod.rs

//! Typed records for the storefront domain. Rows coming from storage are
//! converted into these before they reach the pricing engine.

pub mod cart;
pub mod event;
pub mod order;
pub mod product;

pub use cart::{cart_total, CartLineItem};
pub use event::{Event, EventOutcome};
pub use order::{Order, OrderItem, OrderStatus};
pub use product::{PriceBasis, Product};
