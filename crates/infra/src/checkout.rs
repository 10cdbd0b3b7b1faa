//! Checkout pricing service.
//!
//! Wires the pure validator to the coupon store: `quote` computes the
//! payable amount for a course purchase (with an optional coupon code and
//! optional EMI term), `settle` records a successful payment and burns one
//! use of the applied coupon.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use mentora_core::{Amount, CourseId};
use mentora_pricing::{
    validate_coupon, Coupon, CouponOutcome, EmiQuote, InstallmentTerm, OverdrawPolicy,
    RejectReason,
};

use crate::coupon_store::{CouponStore, CouponStoreError};

/// Error from the checkout service. Coupon rejections are NOT errors; they
/// ride inside [`Quote`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum CheckoutError {
    #[error(transparent)]
    Store(#[from] CouponStoreError),
}

/// A priced checkout. `payable` is what the student owes up front, or per
/// the EMI schedule when one is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub course_id: CourseId,
    pub base_price: Amount,
    pub discount_amount: Amount,
    pub payable: Amount,
    /// The coupon that was applied, if any.
    pub coupon: Option<Coupon>,
    /// Why the submitted code was rejected, if it was.
    pub rejection: Option<RejectReason>,
    pub emi: Option<EmiQuote>,
}

/// Checkout service over a coupon store.
pub struct CheckoutService<S> {
    store: Arc<S>,
    overdraw: OverdrawPolicy,
}

impl<S: CouponStore + mentora_pricing::CouponDirectory> CheckoutService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            overdraw: OverdrawPolicy::default(),
        }
    }

    pub fn with_overdraw_policy(mut self, policy: OverdrawPolicy) -> Self {
        self.overdraw = policy;
        self
    }

    /// Price a purchase. A rejected code still produces a quote at full
    /// price, carrying the rejection reason for display.
    pub fn quote(
        &self,
        course_id: CourseId,
        base_price: Amount,
        coupon_code: Option<&str>,
        now: DateTime<Utc>,
    ) -> Quote {
        let mut quote = Quote {
            course_id,
            base_price,
            discount_amount: 0,
            payable: base_price,
            coupon: None,
            rejection: None,
            emi: None,
        };

        let Some(code) = coupon_code else {
            return quote;
        };

        match validate_coupon(
            course_id,
            code,
            base_price,
            self.store.as_ref(),
            now,
            self.overdraw,
        ) {
            CouponOutcome::Applied(applied) => {
                debug!(code, discount = applied.discount_amount, "coupon applied");
                quote.discount_amount = applied.discount_amount;
                quote.payable = applied.discounted_price;
                quote.coupon = Some(applied.coupon);
            }
            CouponOutcome::Rejected { reason } => {
                debug!(code, reason = %reason, "coupon rejected");
                quote.rejection = Some(reason);
            }
        }

        quote
    }

    /// Price a purchase with an installment schedule derived from the
    /// payable amount.
    pub fn quote_with_emi(
        &self,
        course_id: CourseId,
        base_price: Amount,
        coupon_code: Option<&str>,
        term: InstallmentTerm,
        now: DateTime<Utc>,
    ) -> Quote {
        let mut quote = self.quote(course_id, base_price, coupon_code, now);
        quote.emi = Some(EmiQuote::new(quote.payable, term));
        quote
    }

    /// Record a successful payment for `quote`: burns one use of the
    /// applied coupon, atomically against the cap. Call exactly once per
    /// settled payment.
    pub fn settle(&self, quote: &Quote) -> Result<(), CheckoutError> {
        if let Some(coupon) = &quote.coupon {
            let updated = self.store.increment_usage(coupon.id)?;
            debug!(
                code = %updated.code,
                used = updated.used_count,
                limit = updated.usage_limit,
                "coupon use recorded"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coupon_store::InMemoryCouponStore;
    use chrono::TimeDelta;
    use mentora_core::CouponId;
    use mentora_pricing::{Applicability, CouponStatus, Discount};

    fn seeded_service(
        discount: Discount,
        usage_limit: u32,
    ) -> (
        CheckoutService<InMemoryCouponStore>,
        Arc<InMemoryCouponStore>,
        CouponId,
    ) {
        let store = InMemoryCouponStore::arc();
        let now = Utc::now();
        let id = store
            .create(Coupon {
                id: CouponId::new(),
                code: "LAUNCH50".to_string(),
                discount,
                valid_from: now - TimeDelta::days(1),
                valid_until: now + TimeDelta::days(30),
                usage_limit,
                used_count: 0,
                status: CouponStatus::Active,
                applies_to: Applicability::AllCourses,
            })
            .unwrap();
        (CheckoutService::new(store.clone()), store, id)
    }

    #[test]
    fn quote_without_code_is_full_price() {
        let (service, _store, _) = seeded_service(Discount::Percentage(50), 10);
        let quote = service.quote(CourseId::new(), 499, None, Utc::now());
        assert_eq!(quote.payable, 499);
        assert_eq!(quote.discount_amount, 0);
        assert!(quote.coupon.is_none());
        assert!(quote.rejection.is_none());
    }

    #[test]
    fn quote_applies_valid_coupon() {
        let (service, _store, _) = seeded_service(Discount::Percentage(50), 10);
        let quote = service.quote(CourseId::new(), 499, Some("launch50"), Utc::now());
        assert_eq!(quote.discount_amount, 250);
        assert_eq!(quote.payable, 249);
        assert!(quote.coupon.is_some());
    }

    #[test]
    fn rejected_code_keeps_full_price_and_carries_the_reason() {
        let (service, _store, _) = seeded_service(Discount::Percentage(50), 10);
        let quote = service.quote(CourseId::new(), 499, Some("NOPE"), Utc::now());
        assert_eq!(quote.payable, 499);
        assert_eq!(quote.rejection, Some(RejectReason::InvalidCode));
    }

    #[test]
    fn emi_schedule_derives_from_the_discounted_price() {
        let (service, _store, _) = seeded_service(Discount::Percentage(50), 10);
        let quote = service.quote_with_emi(
            CourseId::new(),
            499,
            Some("LAUNCH50"),
            InstallmentTerm::ThreeMonths,
            Utc::now(),
        );
        // payable 249, surcharged and split: round(249 * 1.05 / 3) = 87.
        let emi = quote.emi.unwrap();
        assert_eq!(emi.per_installment, 87);
    }

    #[test]
    fn settle_burns_exactly_one_use() {
        let (service, store, id) = seeded_service(Discount::Percentage(50), 2);
        let quote = service.quote(CourseId::new(), 499, Some("LAUNCH50"), Utc::now());
        service.settle(&quote).unwrap();

        let used = store.get(id).unwrap().unwrap().used_count;
        assert_eq!(used, 1);
    }

    #[test]
    fn settle_without_coupon_touches_nothing() {
        let (service, store, id) = seeded_service(Discount::Percentage(50), 2);
        let quote = service.quote(CourseId::new(), 499, None, Utc::now());
        service.settle(&quote).unwrap();
        assert_eq!(store.get(id).unwrap().unwrap().used_count, 0);
    }

    #[test]
    fn settle_surfaces_an_exhausted_cap() {
        let (service, _store, _) = seeded_service(Discount::Percentage(50), 1);
        let first = service.quote(CourseId::new(), 499, Some("LAUNCH50"), Utc::now());
        // Validation snapshots race settlement: both quotes see uses left.
        let second = service.quote(CourseId::new(), 499, Some("LAUNCH50"), Utc::now());

        service.settle(&first).unwrap();
        let err = service.settle(&second).unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::Store(CouponStoreError::UsageExhausted(_))
        ));
    }
}
