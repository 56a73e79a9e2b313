//! Schedulable delay abstraction used between retry attempts.

use std::time::Duration;

use async_trait::async_trait;

use crate::token::ActivationToken;

/// Waits out the delay before a retry attempt.
///
/// Implementations only provide the timer. Cancellation is cooperative: the retry
/// controller re-checks `token` once the wait returns, so a timer that keeps
/// running after cancellation simply has no effect.
#[async_trait]
pub trait RetryScheduler: Send + Sync {
    /// Resolve after `delay` has elapsed.
    async fn wait(&self, delay: Duration, token: &ActivationToken);
}

/// Scheduler backed by tokio's timer.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioScheduler;

#[async_trait]
impl RetryScheduler for TokioScheduler {
    async fn wait(&self, delay: Duration, _token: &ActivationToken) {
        tokio::time::sleep(delay).await;
    }
}
