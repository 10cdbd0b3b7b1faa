//! `mentora-pricing` — coupon validation and pricing policy.
//!
//! Deterministic business rules for checkout: given a course, a coupon code
//! and a price, either compute the discounted price or reject the code with
//! a user-facing reason. Also derives EMI installment amounts. Everything in
//! this crate is a pure function over its inputs plus a snapshot of coupon
//! state; mutation (usage counting) lives behind the store in `mentora-infra`.

pub mod coupon;
pub mod emi;
pub mod money;
pub mod validate;

pub use coupon::{Applicability, Coupon, CouponStatus, Discount};
pub use emi::{EmiQuote, InstallmentTerm};
pub use validate::{
    validate_coupon, AppliedCoupon, CouponDirectory, CouponOutcome, OverdrawPolicy, RejectReason,
};
