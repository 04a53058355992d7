// cashbak/storefront/src/pipelines/mod.rs

//! The storefront's step flows: adding a quoted line to a cart, and checkout
//! wired to Postgres, the mock gateway and the mock mailer.

pub mod cart_pipeline;
pub mod checkout_pipeline;

pub use cart_pipeline::{build_add_to_cart_pipeline, AddToCartCtxData, AddToCartFlow};
pub use checkout_pipeline::build_checkout_pipeline;
