//! Bounded retry with linear backoff.
//!
//! # Design
//! - `delay_for_attempt(n) = base_delay * n`: 1s after the first failure, 2s after the second.
//! - The token is checked before every attempt, before scheduling a retry, and again
//!   once the delay fires; a cancelled token ends the chain silently.
//! - The controller never touches slot state; callers observe attempts via `on_attempt`.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use otaku_gateway::{GatewayError, GatewayResult};

use crate::scheduler::RetryScheduler;
use crate::token::ActivationToken;

/// Retries granted after the first failure.
pub const DEFAULT_MAX_RETRIES: u32 = 2;
/// Delay unit multiplied by the failed attempt number.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1_000);

/// Retry budget and backoff shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries allowed after the first attempt.
    pub max_retries: u32,
    /// Base delay for the linear backoff.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after attempt `attempt` failed.
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }

    /// Total tries including the first.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

/// How a retried operation ended.
#[derive(Debug, PartialEq)]
pub enum RetryOutcome<T> {
    /// An attempt succeeded.
    Success {
        /// Value produced by the successful attempt.
        value: T,
        /// Attempts issued, including the successful one.
        attempts: u32,
    },
    /// Every attempt failed.
    Exhausted {
        /// Failure of the last attempt.
        error: GatewayError,
        /// Attempts issued.
        attempts: u32,
    },
    /// The activation was superseded before the chain finished.
    Cancelled {
        /// Attempts issued before cancellation was observed.
        attempts: u32,
    },
}

/// Drives an operation through a [`RetryPolicy`].
#[derive(Clone)]
pub struct RetryController {
    policy: RetryPolicy,
    scheduler: Arc<dyn RetryScheduler>,
}

impl RetryController {
    /// Controller using `scheduler` for the waits between attempts.
    #[must_use]
    pub fn new(policy: RetryPolicy, scheduler: Arc<dyn RetryScheduler>) -> Self {
        Self { policy, scheduler }
    }

    /// Policy in effect.
    #[must_use]
    pub const fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Run `op` until it succeeds, the budget is spent, or `token` is cancelled.
    ///
    /// `on_attempt` is invoked with the 1-based attempt number right before each call.
    pub async fn run<T, F, Fut, A>(
        &self,
        token: &ActivationToken,
        mut op: F,
        mut on_attempt: A,
    ) -> RetryOutcome<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = GatewayResult<T>>,
        A: FnMut(u32),
    {
        let mut attempts = 0u32;
        loop {
            if token.is_cancelled() {
                return RetryOutcome::Cancelled { attempts };
            }
            attempts += 1;
            on_attempt(attempts);

            let error = match op().await {
                Ok(value) => return RetryOutcome::Success { value, attempts },
                Err(error) => error,
            };

            if attempts >= self.policy.max_attempts() {
                return RetryOutcome::Exhausted { error, attempts };
            }
            if token.is_cancelled() {
                return RetryOutcome::Cancelled { attempts };
            }

            let delay = self.policy.delay_for_attempt(attempts);
            tracing::warn!(
                attempt = attempts,
                max_retries = self.policy.max_retries,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                error = %error,
                "attempt failed; scheduling retry"
            );
            self.scheduler.wait(delay, token).await;
        }
    }
}
