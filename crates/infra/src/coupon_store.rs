//! Coupon storage.
//!
//! The store is the single owner of coupon mutation. Validation reads a
//! snapshot through [`CouponDirectory`]; usage counting goes through
//! [`CouponStore::increment_usage`], which re-checks the cap and increments
//! under one lock acquisition so a capped coupon cannot oversell.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use mentora_core::CouponId;
use mentora_pricing::{Coupon, CouponDirectory, CouponStatus};

/// Coupon store abstraction (the data collaborator from the checkout's
/// point of view).
pub trait CouponStore: Send + Sync {
    /// Persist a new coupon. Codes are unique case-insensitively.
    fn create(&self, coupon: Coupon) -> Result<CouponId, CouponStoreError>;

    /// Fetch a coupon by id.
    fn get(&self, id: CouponId) -> Result<Option<Coupon>, CouponStoreError>;

    /// Fetch a coupon by code, matched case-insensitively.
    fn find_by_code(&self, code: &str) -> Result<Option<Coupon>, CouponStoreError>;

    /// Replace an existing coupon (admin edit).
    fn update(&self, coupon: &Coupon) -> Result<(), CouponStoreError>;

    /// Toggle a coupon's status (admin action).
    fn set_status(&self, id: CouponId, status: CouponStatus) -> Result<Coupon, CouponStoreError>;

    /// Remove a coupon (explicit admin removal; nothing else deletes).
    fn remove(&self, id: CouponId) -> Result<(), CouponStoreError>;

    /// Atomically check `used_count < usage_limit` and increment. Called
    /// exactly once per successful payment that applied the coupon.
    fn increment_usage(&self, id: CouponId) -> Result<Coupon, CouponStoreError>;

    /// List all coupons (admin view).
    fn list(&self) -> Result<Vec<Coupon>, CouponStoreError>;
}

/// Coupon store error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CouponStoreError {
    #[error("coupon not found: {0}")]
    NotFound(CouponId),
    #[error("coupon code already exists: {0}")]
    DuplicateCode(String),
    #[error("usage limit already reached for coupon {0}")]
    UsageExhausted(CouponId),
    /// Backend failure. The in-memory store never emits this; persistent
    /// store implementations map their driver errors into it.
    #[error("storage error: {0}")]
    Storage(String),
}

/// In-memory coupon store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryCouponStore {
    coupons: RwLock<HashMap<CouponId, Coupon>>,
}

impl InMemoryCouponStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl CouponStore for InMemoryCouponStore {
    fn create(&self, coupon: Coupon) -> Result<CouponId, CouponStoreError> {
        let mut coupons = self.coupons.write().unwrap();
        if coupons.values().any(|c| c.code_matches(&coupon.code)) {
            return Err(CouponStoreError::DuplicateCode(coupon.code));
        }
        let id = coupon.id;
        coupons.insert(id, coupon);
        Ok(id)
    }

    fn get(&self, id: CouponId) -> Result<Option<Coupon>, CouponStoreError> {
        Ok(self.coupons.read().unwrap().get(&id).cloned())
    }

    fn find_by_code(&self, code: &str) -> Result<Option<Coupon>, CouponStoreError> {
        Ok(self
            .coupons
            .read()
            .unwrap()
            .values()
            .find(|c| c.code_matches(code))
            .cloned())
    }

    fn update(&self, coupon: &Coupon) -> Result<(), CouponStoreError> {
        let mut coupons = self.coupons.write().unwrap();
        if !coupons.contains_key(&coupon.id) {
            return Err(CouponStoreError::NotFound(coupon.id));
        }
        coupons.insert(coupon.id, coupon.clone());
        Ok(())
    }

    fn set_status(&self, id: CouponId, status: CouponStatus) -> Result<Coupon, CouponStoreError> {
        let mut coupons = self.coupons.write().unwrap();
        let coupon = coupons.get_mut(&id).ok_or(CouponStoreError::NotFound(id))?;
        coupon.status = status;
        Ok(coupon.clone())
    }

    fn remove(&self, id: CouponId) -> Result<(), CouponStoreError> {
        let mut coupons = self.coupons.write().unwrap();
        coupons
            .remove(&id)
            .map(|_| ())
            .ok_or(CouponStoreError::NotFound(id))
    }

    fn increment_usage(&self, id: CouponId) -> Result<Coupon, CouponStoreError> {
        // Check and increment under the same write lock: concurrent
        // payments cannot both pass the cap check.
        let mut coupons = self.coupons.write().unwrap();
        let coupon = coupons.get_mut(&id).ok_or(CouponStoreError::NotFound(id))?;
        if coupon.used_count >= coupon.usage_limit {
            return Err(CouponStoreError::UsageExhausted(id));
        }
        coupon.used_count += 1;
        Ok(coupon.clone())
    }

    fn list(&self) -> Result<Vec<Coupon>, CouponStoreError> {
        Ok(self.coupons.read().unwrap().values().cloned().collect())
    }
}

impl CouponDirectory for InMemoryCouponStore {
    fn find_by_code(&self, code: &str) -> Option<Coupon> {
        CouponStore::find_by_code(self, code).ok().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, Utc};
    use mentora_pricing::{Applicability, Discount};

    fn coupon(code: &str, usage_limit: u32) -> Coupon {
        let now = Utc::now();
        Coupon {
            id: CouponId::new(),
            code: code.to_string(),
            discount: Discount::Percentage(10),
            valid_from: now - TimeDelta::days(1),
            valid_until: now + TimeDelta::days(30),
            usage_limit,
            used_count: 0,
            status: CouponStatus::Active,
            applies_to: Applicability::AllCourses,
        }
    }

    #[test]
    fn lookup_by_code_ignores_case() {
        let store = InMemoryCouponStore::new();
        store.create(coupon("LAUNCH50", 10)).unwrap();

        let found = CouponStore::find_by_code(&store, "launch50").unwrap();
        assert!(found.is_some());
        assert_eq!(found.unwrap().code, "LAUNCH50");
    }

    #[test]
    fn duplicate_codes_are_rejected_case_insensitively() {
        let store = InMemoryCouponStore::new();
        store.create(coupon("LAUNCH50", 10)).unwrap();

        let err = store.create(coupon("launch50", 10)).unwrap_err();
        assert!(matches!(err, CouponStoreError::DuplicateCode(_)));
    }

    #[test]
    fn increment_usage_stops_at_the_limit() {
        let store = InMemoryCouponStore::new();
        let id = store.create(coupon("CAPPED", 2)).unwrap();

        assert_eq!(store.increment_usage(id).unwrap().used_count, 1);
        assert_eq!(store.increment_usage(id).unwrap().used_count, 2);

        let err = store.increment_usage(id).unwrap_err();
        assert!(matches!(err, CouponStoreError::UsageExhausted(_)));

        // The counter never moved past the cap.
        assert_eq!(store.get(id).unwrap().unwrap().used_count, 2);
    }

    #[test]
    fn concurrent_increments_never_oversell() {
        let store = InMemoryCouponStore::arc();
        let id = store.create(coupon("RACE", 5)).unwrap();

        let handles: Vec<_> = (0..10)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || store.increment_usage(id).is_ok())
            })
            .collect();

        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        assert_eq!(successes, 5);
        assert_eq!(store.get(id).unwrap().unwrap().used_count, 5);
    }

    #[test]
    fn set_status_toggles_and_remove_deletes() {
        let store = InMemoryCouponStore::new();
        let id = store.create(coupon("TOGGLE", 10)).unwrap();

        let updated = store.set_status(id, CouponStatus::Disabled).unwrap();
        assert_eq!(updated.status, CouponStatus::Disabled);

        store.remove(id).unwrap();
        assert!(store.get(id).unwrap().is_none());
        assert!(matches!(
            store.remove(id).unwrap_err(),
            CouponStoreError::NotFound(_)
        ));
    }
}
