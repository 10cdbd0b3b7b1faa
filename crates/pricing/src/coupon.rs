//! The coupon entity.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mentora_core::{Amount, CouponId, CourseId};

/// Discount kind and value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Discount {
    /// Percentage of the course price, 0..=100 in normal use.
    Percentage(u32),
    /// Flat amount in minor currency units. Deliberately NOT capped to the
    /// course price here; see `OverdrawPolicy`.
    FixedAmount(Amount),
}

/// Administrative status. Disabled coupons fail validation regardless of
/// their window or usage counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CouponStatus {
    Active,
    Disabled,
}

/// Which courses a coupon can be applied to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Applicability {
    AllCourses,
    Courses(HashSet<CourseId>),
}

impl Applicability {
    pub fn covers(&self, course_id: CourseId) -> bool {
        match self {
            Applicability::AllCourses => true,
            Applicability::Courses(set) => set.contains(&course_id),
        }
    }
}

/// A discount coupon.
///
/// Created and edited by administrators through the coupon store;
/// `used_count` only ever moves forward, via the store's atomic
/// check-and-increment after a successful payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coupon {
    pub id: CouponId,
    /// Unique code, matched case-insensitively.
    pub code: String,
    pub discount: Discount,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub usage_limit: u32,
    pub used_count: u32,
    pub status: CouponStatus,
    pub applies_to: Applicability,
}

impl Coupon {
    pub fn is_active(&self) -> bool {
        self.status == CouponStatus::Active
    }

    /// Whether `now` falls inside the coupon's validity window.
    pub fn in_window(&self, now: DateTime<Utc>) -> bool {
        now >= self.valid_from && now <= self.valid_until
    }

    pub fn has_uses_left(&self) -> bool {
        self.used_count < self.usage_limit
    }

    pub fn code_matches(&self, code: &str) -> bool {
        self.code.eq_ignore_ascii_case(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn sample_coupon() -> Coupon {
        let now = Utc::now();
        Coupon {
            id: CouponId::new(),
            code: "LAUNCH50".to_string(),
            discount: Discount::Percentage(50),
            valid_from: now - TimeDelta::days(1),
            valid_until: now + TimeDelta::days(30),
            usage_limit: 100,
            used_count: 0,
            status: CouponStatus::Active,
            applies_to: Applicability::AllCourses,
        }
    }

    #[test]
    fn code_match_is_case_insensitive() {
        let coupon = sample_coupon();
        assert!(coupon.code_matches("launch50"));
        assert!(coupon.code_matches("Launch50"));
        assert!(!coupon.code_matches("launch51"));
    }

    #[test]
    fn window_includes_both_edges() {
        let coupon = sample_coupon();
        assert!(coupon.in_window(coupon.valid_from));
        assert!(coupon.in_window(coupon.valid_until));
        assert!(!coupon.in_window(coupon.valid_until + TimeDelta::seconds(1)));
        assert!(!coupon.in_window(coupon.valid_from - TimeDelta::seconds(1)));
    }

    #[test]
    fn explicit_applicability_only_covers_listed_courses() {
        let listed = CourseId::new();
        let other = CourseId::new();
        let applies = Applicability::Courses([listed].into_iter().collect());
        assert!(applies.covers(listed));
        assert!(!applies.covers(other));
    }
}
