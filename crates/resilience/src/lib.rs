//! `mentora-resilience` — retry-with-backoff execution for the request layer.
//!
//! Wraps an arbitrary async operation, classifies failures as retryable or
//! fatal, and re-issues retryable ones with exponential backoff and jitter
//! up to a bounded attempt count. Callers must ensure the wrapped operation
//! is idempotent: the executor knows nothing about side effects and will
//! happily re-run a non-idempotent request.

pub mod cancel;
pub mod error;
pub mod executor;
pub mod policy;

pub use cancel::CancelToken;
pub use error::{RequestError, RetryError, RETRYABLE_STATUS};
pub use executor::{execute, Retrier};
pub use policy::RetryPolicy;
