// cashbak/storefront/src/db/mod.rs

//! Postgres access: catalog snapshots, carts, orders and the stock ledger.
//! All queries are runtime-checked (`sqlx::query_as`), no compile-time database needed.

pub mod cart;
pub mod catalog;
pub mod orders;
pub mod seed;
pub mod stock;

pub use orders::PgOrderStore;
pub use stock::PgStockLedger;
