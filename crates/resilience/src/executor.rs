//! The backoff executor.

use std::future::Future;

use rand::Rng;
use tracing::{debug, info, warn};

use crate::cancel::CancelToken;
use crate::error::{RequestError, RetryError};
use crate::policy::RetryPolicy;

/// Observer invoked after each backoff sleep, before the next attempt:
/// (attempt number just failed, its error, the delay that was slept).
pub type RetryObserver = Box<dyn Fn(u32, &RequestError, std::time::Duration) + Send + Sync>;

/// Executes an async operation under a [`RetryPolicy`].
///
/// Each call to [`Retrier::run`] owns its own attempt counter and timer
/// state; there is no shared mutable state between calls. The wrapped
/// operation MUST be idempotent from the caller's perspective: retrying is
/// assumed not to double-apply side effects. That obligation is the
/// caller's, not enforced here.
pub struct Retrier {
    policy: RetryPolicy,
    on_retry: Option<RetryObserver>,
    cancel: Option<CancelToken>,
}

impl Retrier {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            on_retry: None,
            cancel: None,
        }
    }

    /// Attach a retry observer.
    pub fn with_observer<F>(mut self, observer: F) -> Self
    where
        F: Fn(u32, &RequestError, std::time::Duration) + Send + Sync + 'static,
    {
        self.on_retry = Some(Box::new(observer));
        self
    }

    /// Attach a cancellation token, checked before each attempt and each
    /// sleep.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run `op` until it succeeds, fails fatally, or exhausts the policy's
    /// attempt budget.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T, RetryError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RequestError>>,
    {
        let max_attempts = self.policy.max_attempts();
        let mut attempt = 1u32;

        loop {
            if self.is_cancelled() {
                return Err(RetryError::Cancelled);
            }

            match op().await {
                Ok(value) => {
                    if attempt > 1 {
                        info!(attempt, "request succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(err) if !err.is_retryable() => {
                    debug!(attempt, error = %err, "fatal request error, not retrying");
                    return Err(RetryError::Fatal { source: err });
                }
                Err(err) if attempt >= max_attempts => {
                    warn!(
                        attempts = attempt,
                        error = %err,
                        "retry budget exhausted"
                    );
                    return Err(RetryError::Exhausted {
                        attempts: attempt,
                        source: err,
                    });
                }
                Err(err) => {
                    let delay = self.policy.backoff_delay(attempt, self.sample_jitter());
                    warn!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "transient request error, backing off"
                    );

                    if self.is_cancelled() {
                        return Err(RetryError::Cancelled);
                    }
                    tokio::time::sleep(delay).await;

                    if let Some(observer) = &self.on_retry {
                        observer(attempt, &err, delay);
                    }
                    attempt += 1;
                }
            }
        }
    }

    /// Like [`Retrier::run`], but races each attempt against the policy's
    /// `attempt_timeout`. A fired deadline cancels the in-flight attempt
    /// and counts as a retryable [`RequestError::Timeout`].
    pub async fn run_with_timeout<T, F, Fut>(&self, mut op: F) -> Result<T, RetryError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RequestError>>,
    {
        let per_attempt = self.policy.attempt_timeout;
        self.run(move || {
            let fut = op();
            async move {
                match tokio::time::timeout(per_attempt, fut).await {
                    Ok(result) => result,
                    Err(_) => Err(RequestError::Timeout),
                }
            }
        })
        .await
    }

    fn sample_jitter(&self) -> f64 {
        if self.policy.jitter > 0.0 {
            rand::rng().random_range(-1.0..=1.0)
        } else {
            0.0
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }
}

/// Convenience wrapper: run `op` under `policy` with no observer or token.
pub async fn execute<T, F, Fut>(policy: &RetryPolicy, op: F) -> Result<T, RetryError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RequestError>>,
{
    Retrier::new(policy.clone()).run(op).await
}
