//! Per-activation cancellation token.
//!
//! # Design
//! - One token per (slot, identity) activation; clones share the same flag.
//! - Cancellation is monotonic: once set it never clears.
//! - Continuations check the token immediately before applying their effect.

use tokio_util::sync::CancellationToken;

/// Cancellation flag owned by a single slot activation.
#[derive(Clone, Debug, Default)]
pub struct ActivationToken {
    inner: CancellationToken,
}

impl ActivationToken {
    /// Create a live token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the activation as superseded. Idempotent.
    pub fn cancel(&self) {
        self.inner.cancel();
    }

    /// Whether the activation has been superseded.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.inner.is_cancelled()
    }

    /// Resolve once the activation is superseded.
    pub async fn cancelled(&self) {
        self.inner.cancelled().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancellation_is_monotonic_and_shared() {
        let token = ActivationToken::new();
        let clone = token.clone();
        assert!(!token.is_cancelled());

        clone.cancel();
        assert!(token.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn independent_tokens_do_not_interfere() {
        let first = ActivationToken::new();
        let second = ActivationToken::new();
        first.cancel();
        assert!(!second.is_cancelled());
    }

    #[tokio::test]
    async fn cancelled_future_resolves_after_cancel() {
        let token = ActivationToken::new();
        let waiter = token.clone();
        let handle = tokio::spawn(async move { waiter.cancelled().await });
        token.cancel();
        handle.await.expect("waiter task joins");
    }
}
