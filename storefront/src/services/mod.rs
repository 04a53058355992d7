// cashbak/storefront/src/services/mod.rs
pub mod email_mock;
pub mod webpay_mock;

pub use email_mock::MockEmailNotifier;
pub use webpay_mock::MockWebpay;
