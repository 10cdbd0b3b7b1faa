//! `mentora-core` — domain foundation for the Mentora marketplace core.
//!
//! Pure domain primitives only: typed identifiers and the domain error
//! model. No I/O, no infrastructure concerns.

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::{CouponId, CourseId, StudentId};

/// Monetary amount in minor currency units (e.g. cents, paise).
///
/// Signed on purpose: a fixed-amount discount larger than the course price
/// produces a negative payable amount unless the caller opts into clamping.
pub type Amount = i64;
