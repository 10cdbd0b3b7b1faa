//! Infrastructure layer: the coupon data collaborator, the checkout
//! service, and the retrying HTTP adapter.

pub mod checkout;
pub mod coupon_store;
pub mod http;

pub use checkout::{CheckoutError, CheckoutService, Quote};
pub use coupon_store::{CouponStore, CouponStoreError, InMemoryCouponStore};
pub use http::ApiClient;
