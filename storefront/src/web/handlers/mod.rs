// cashbak/storefront/src/web/handlers/mod.rs

pub mod cart_handlers;
pub mod catalog_handlers;
pub mod checkout_handlers;
pub mod pricing_handlers;
pub mod settlement_handlers;
