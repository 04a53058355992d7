// cashbak/src/checkout/mod.rs

//! Checkout orchestration over external order, payment, stock and email services.

pub mod collaborators;
pub mod flow;
pub mod state;

pub use collaborators::{Notifier, OrderStore, PaymentConfirmation, PaymentGateway, PaymentRedirect, PaymentRequest};
pub use flow::{
  build_checkout_flow, run_checkout, CheckoutFlow, CheckoutReport, CheckoutServices, CONFIRM_PAYMENT, CREATE_ORDER,
  DECREMENT_STOCK, SEND_CONFIRMATION,
};
pub use state::CheckoutState;
