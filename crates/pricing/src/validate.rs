//! Coupon validation pipeline.
//!
//! `validate_coupon` is a pure function over its inputs plus the coupon
//! snapshot returned by the directory. It never mutates anything: usage
//! counting is a separate, explicit store operation invoked only after a
//! successful payment. Results are computed fresh on every call; the usage
//! counter can change between calls, so they must not be cached.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mentora_core::{Amount, CourseId};

use crate::coupon::{Coupon, Discount};
use crate::money::percentage_of;

/// Read-only lookup the validator consults for the current coupon snapshot.
///
/// Implementations must match codes case-insensitively.
pub trait CouponDirectory {
    fn find_by_code(&self, code: &str) -> Option<Coupon>;
}

/// What to do when a fixed-amount discount exceeds the course price.
///
/// The source behavior (and the default here) lets the discounted price go
/// negative; callers wanting stricter semantics opt into clamping or
/// rejection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverdrawPolicy {
    /// Keep the discount verbatim; the discounted price may be negative.
    #[default]
    Allow,
    /// Cap the discount at the course price; the discounted price bottoms
    /// out at zero.
    ClampToZero,
    /// Treat the coupon as inapplicable to this purchase.
    Reject,
}

/// Why a coupon code was rejected. Serialized codes are user-facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    InvalidCode,
    CouponDisabled,
    CouponExpired,
    UsageLimitReached,
    NotApplicableToCourse,
}

impl RejectReason {
    pub fn code(&self) -> &'static str {
        match self {
            RejectReason::InvalidCode => "invalid_code",
            RejectReason::CouponDisabled => "coupon_disabled",
            RejectReason::CouponExpired => "coupon_expired",
            RejectReason::UsageLimitReached => "usage_limit_reached",
            RejectReason::NotApplicableToCourse => "not_applicable_to_course",
        }
    }
}

impl core::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

/// A successfully applied coupon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedCoupon {
    pub coupon: Coupon,
    pub discount_amount: Amount,
    pub discounted_price: Amount,
}

/// Outcome of a validation call. Rejections are ordinary values, not
/// errors: they carry a reason code meant for direct display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "result")]
pub enum CouponOutcome {
    Applied(AppliedCoupon),
    Rejected { reason: RejectReason },
}

impl CouponOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, CouponOutcome::Applied(_))
    }

    pub fn applied(&self) -> Option<&AppliedCoupon> {
        match self {
            CouponOutcome::Applied(applied) => Some(applied),
            CouponOutcome::Rejected { .. } => None,
        }
    }

    pub fn rejection(&self) -> Option<RejectReason> {
        match self {
            CouponOutcome::Applied(_) => None,
            CouponOutcome::Rejected { reason } => Some(*reason),
        }
    }

    fn rejected(reason: RejectReason) -> Self {
        CouponOutcome::Rejected { reason }
    }
}

/// Validate `code` against `course_id` at `course_price`.
///
/// Checks run in a fixed order and short-circuit at the first failure:
/// existence, status, validity window, usage cap, course applicability.
/// A coupon that is both expired and used up therefore reports
/// `coupon_expired`.
pub fn validate_coupon(
    course_id: CourseId,
    code: &str,
    course_price: Amount,
    directory: &dyn CouponDirectory,
    now: DateTime<Utc>,
    policy: OverdrawPolicy,
) -> CouponOutcome {
    let Some(coupon) = directory.find_by_code(code) else {
        return CouponOutcome::rejected(RejectReason::InvalidCode);
    };

    if !coupon.is_active() {
        return CouponOutcome::rejected(RejectReason::CouponDisabled);
    }
    if !coupon.in_window(now) {
        return CouponOutcome::rejected(RejectReason::CouponExpired);
    }
    if !coupon.has_uses_left() {
        return CouponOutcome::rejected(RejectReason::UsageLimitReached);
    }
    if !coupon.applies_to.covers(course_id) {
        return CouponOutcome::rejected(RejectReason::NotApplicableToCourse);
    }

    let mut discount_amount = match coupon.discount {
        Discount::Percentage(pct) => percentage_of(course_price, pct),
        Discount::FixedAmount(amount) => amount,
    };

    if discount_amount > course_price {
        match policy {
            OverdrawPolicy::Allow => {}
            OverdrawPolicy::ClampToZero => discount_amount = course_price,
            OverdrawPolicy::Reject => {
                return CouponOutcome::rejected(RejectReason::NotApplicableToCourse);
            }
        }
    }

    CouponOutcome::Applied(AppliedCoupon {
        discounted_price: course_price - discount_amount,
        discount_amount,
        coupon,
    })
}
