//! Retry policy and backoff delay computation.

use std::time::Duration;

/// Configuration for a retry sequence. Immutable per call; the executor
/// never shares mutable state between calls.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the initial attempt. The default of 3 yields 4 total
    /// attempts.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Upper bound applied AFTER jitter.
    pub max_delay: Duration,
    /// Exponential growth factor per attempt.
    pub multiplier: f64,
    /// Symmetric jitter fraction: the exponential delay is perturbed by a
    /// uniform ±(jitter * delay) before clamping to `max_delay`.
    pub jitter: f64,
    /// Per-attempt deadline used by `Retrier::run_with_timeout`.
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(10_000),
            multiplier: 2.0,
            jitter: 0.25,
            attempt_timeout: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Policy that never retries.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    /// Total attempts including the initial one.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay before the retry that follows failed attempt `attempt`
    /// (1-based).
    ///
    /// `jitter_unit` is the sampled perturbation in [-1, 1]; the executor
    /// draws it uniformly, tests pass fixed values for reproducible
    /// vectors. Jitter applies to the raw exponential value and only then
    /// is the result clamped to `max_delay`.
    pub fn backoff_delay(&self, attempt: u32, jitter_unit: f64) -> Duration {
        let base_ms = self.base_delay.as_millis() as f64;
        let max_ms = self.max_delay.as_millis() as f64;

        let exponential = base_ms * self.multiplier.powi(attempt.saturating_sub(1) as i32);
        let jittered = exponential * (1.0 + self.jitter * jitter_unit.clamp(-1.0, 1.0));
        let clamped = jittered.min(max_ms).max(0.0);

        Duration::from_millis(clamped as u64)
    }
}
