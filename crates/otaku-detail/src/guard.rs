//! Staleness guard around a single fetch slot.
//!
//! # Design
//! - The slot, its current activation token and a closed flag live together in one
//!   `watch` channel value, so every read and write goes through the channel lock.
//! - `apply` checks the caller's token and mutates the slot inside the same write
//!   critical section; `reset` and `close` cancel the previous token inside it too.
//!   A continuation therefore either lands before the supersession or not at all.
//! - Watchers only ever receive [`SlotSnapshot`] copies.

use tokio::sync::watch;

use crate::slot::{FetchSlot, FetchStatus, SlotKind, SlotSnapshot, TransitionError};
use crate::token::ActivationToken;

struct SlotCell<T> {
    slot: FetchSlot<T>,
    token: ActivationToken,
    closed: bool,
}

/// Result of routing a continuation through the guard.
#[derive(Debug, PartialEq, Eq)]
pub enum Applied<R> {
    /// The token was live and the transition was accepted.
    Done(R),
    /// The token was cancelled or the slot closed; nothing changed.
    Stale,
    /// The token was live but the state machine refused the transition.
    Rejected(TransitionError),
}

impl<R> Applied<R> {
    /// Whether the continuation was discarded as stale.
    #[must_use]
    pub const fn is_stale(&self) -> bool {
        matches!(self, Self::Stale)
    }
}

/// A fetch slot that only accepts mutations carrying its live activation token.
pub struct GuardedSlot<T> {
    kind: SlotKind,
    tx: watch::Sender<SlotCell<T>>,
}

impl<T> GuardedSlot<T> {
    /// Idle slot with a live initial token.
    #[must_use]
    pub fn new(kind: SlotKind) -> Self {
        let (tx, _rx) = watch::channel(SlotCell {
            slot: FetchSlot::new(kind),
            token: ActivationToken::new(),
            closed: false,
        });
        Self { kind, tx }
    }

    /// Supersede the current activation: cancel its token and install a fresh idle slot.
    ///
    /// Returns the token of the new activation. Once the slot is closed the returned
    /// token is already cancelled and the slot is left untouched.
    pub fn reset(&self) -> ActivationToken {
        let issued = ActivationToken::new();
        let kind = self.kind;
        self.tx.send_if_modified(|cell| {
            if cell.closed {
                issued.cancel();
                return false;
            }
            cell.token.cancel();
            cell.token = issued.clone();
            cell.slot = FetchSlot::new(kind);
            true
        });
        issued
    }

    /// Token of the current activation.
    #[must_use]
    pub fn current_token(&self) -> ActivationToken {
        self.tx.borrow().token.clone()
    }

    /// Run `f` against the slot if `token` is still the live activation.
    pub fn apply<R, F>(&self, token: &ActivationToken, f: F) -> Applied<R>
    where
        F: FnOnce(&mut FetchSlot<T>) -> Result<R, TransitionError>,
    {
        let mut outcome = Applied::Stale;
        self.tx.send_if_modified(|cell| {
            if cell.closed || token.is_cancelled() {
                return false;
            }
            match f(&mut cell.slot) {
                Ok(value) => {
                    outcome = Applied::Done(value);
                    true
                }
                Err(err) => {
                    outcome = Applied::Rejected(err);
                    false
                }
            }
        });
        outcome
    }

    /// Cancel the current activation permanently. Later `apply` and `reset` calls are no-ops.
    pub fn close(&self) {
        self.tx.send_if_modified(|cell| {
            cell.token.cancel();
            if cell.closed {
                return false;
            }
            cell.closed = true;
            true
        });
    }

    /// Whether [`close`](Self::close) has run.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.borrow().closed
    }

    /// Current lifecycle status.
    #[must_use]
    pub fn status(&self) -> FetchStatus {
        self.tx.borrow().slot.status()
    }

    /// Attempts started for the current activation.
    #[must_use]
    pub fn attempt(&self) -> u32 {
        self.tx.borrow().slot.attempt()
    }

    /// Read-only watcher for the presentation shell.
    #[must_use]
    pub fn subscribe(&self) -> SlotWatcher<T> {
        SlotWatcher {
            rx: self.tx.subscribe(),
        }
    }
}

impl<T: Clone> GuardedSlot<T> {
    /// Copy of the current slot state.
    #[must_use]
    pub fn snapshot(&self) -> SlotSnapshot<T> {
        self.tx.borrow().slot.snapshot()
    }
}

/// Read-only subscription to a [`GuardedSlot`].
pub struct SlotWatcher<T> {
    rx: watch::Receiver<SlotCell<T>>,
}

impl<T: Clone> SlotWatcher<T> {
    /// Copy of the latest published state.
    #[must_use]
    pub fn snapshot(&self) -> SlotSnapshot<T> {
        self.rx.borrow().slot.snapshot()
    }

    /// Wait for the next published change. Returns `false` once the slot is gone.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }

    /// Wait until the slot reaches a terminal status or is closed, then return its state.
    pub async fn settled(&mut self) -> SlotSnapshot<T> {
        let settled = self
            .rx
            .wait_for(|cell| cell.closed || cell.slot.status().is_terminal())
            .await
            .map(|cell| cell.slot.snapshot());
        settled.unwrap_or_else(|_| self.rx.borrow().slot.snapshot())
    }

    /// Whether the owning view closed the slot.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.rx.borrow().closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guarded() -> GuardedSlot<&'static str> {
        GuardedSlot::new(SlotKind::MangaInfo)
    }

    #[test]
    fn live_token_applies_transitions() {
        let slot = guarded();
        let token = slot.reset();
        assert_eq!(slot.apply(&token, FetchSlot::begin_attempt), Applied::Done(1));
        assert_eq!(slot.apply(&token, |s| s.succeed("ok")), Applied::Done(()));
        assert_eq!(slot.snapshot().result, Some("ok"));
    }

    #[test]
    fn superseded_token_is_ignored() {
        let slot = guarded();
        let old = slot.reset();
        slot.apply(&old, FetchSlot::begin_attempt);

        let fresh = slot.reset();
        assert!(old.is_cancelled());
        assert!(slot.apply(&old, |s| s.fail("late")).is_stale());
        assert_eq!(slot.status(), FetchStatus::Idle);

        assert_eq!(slot.apply(&fresh, FetchSlot::begin_attempt), Applied::Done(1));
    }

    #[test]
    fn rejected_transition_leaves_state_alone() {
        let slot = guarded();
        let token = slot.reset();
        let outcome = slot.apply(&token, |s| s.succeed("early"));
        assert!(matches!(outcome, Applied::Rejected(err) if err.from == FetchStatus::Idle));
        assert_eq!(slot.status(), FetchStatus::Idle);
    }

    #[test]
    fn close_cancels_and_freezes() {
        let slot = guarded();
        let token = slot.reset();
        slot.apply(&token, FetchSlot::begin_attempt);
        slot.close();

        assert!(token.is_cancelled());
        assert!(slot.is_closed());
        assert!(slot.apply(&token, |s| s.succeed("late")).is_stale());
        assert_eq!(slot.status(), FetchStatus::Loading);

        let after = slot.reset();
        assert!(after.is_cancelled());
        assert_eq!(slot.status(), FetchStatus::Loading);
    }

    #[tokio::test]
    async fn watcher_sees_terminal_state() {
        let slot = guarded();
        let token = slot.reset();
        let mut watcher = slot.subscribe();

        slot.apply(&token, FetchSlot::begin_attempt);
        slot.apply(&token, |s| s.fail("No manga adaptation found for this anime."));

        let settled = watcher.settled().await;
        assert_eq!(settled.status, FetchStatus::Error);
        assert_eq!(
            settled.error_message.as_deref(),
            Some("No manga adaptation found for this anime.")
        );
    }

    #[tokio::test]
    async fn watcher_is_only_woken_by_live_changes() {
        let slot = guarded();
        let old = slot.reset();
        let fresh = slot.reset();
        let mut watcher = slot.subscribe();

        assert!(slot.apply(&old, FetchSlot::begin_attempt).is_stale());
        assert!(matches!(watcher.rx.has_changed(), Ok(false)));

        slot.apply(&fresh, FetchSlot::begin_attempt);
        assert!(watcher.changed().await);
        assert_eq!(watcher.snapshot().status, FetchStatus::Loading);

        drop(slot);
        assert!(!watcher.changed().await);
    }

    #[tokio::test]
    async fn watcher_wakes_on_close() {
        let slot = guarded();
        let token = slot.reset();
        slot.apply(&token, FetchSlot::begin_attempt);
        let mut watcher = slot.subscribe();

        let waiter = tokio::spawn(async move {
            let snapshot = watcher.settled().await;
            (snapshot.status, watcher.is_closed())
        });
        slot.close();

        let (status, closed) = waiter.await.expect("watcher joins");
        assert_eq!(status, FetchStatus::Loading);
        assert!(closed);
    }

    #[tokio::test]
    async fn racing_continuations_only_land_for_the_live_activation() {
        let slot = std::sync::Arc::new(GuardedSlot::<u32>::new(SlotKind::MangaInfo));
        let first = slot.reset();
        slot.apply(&first, FetchSlot::begin_attempt);
        let second = slot.reset();
        slot.apply(&second, FetchSlot::begin_attempt);

        let stale = {
            let slot = slot.clone();
            tokio::spawn(async move { slot.apply(&first, |s| s.succeed(1)) })
        };
        let live = {
            let slot = slot.clone();
            tokio::spawn(async move { slot.apply(&second, |s| s.succeed(2)) })
        };

        assert!(stale.await.expect("join").is_stale());
        assert_eq!(live.await.expect("join"), Applied::Done(()));
        assert_eq!(slot.snapshot().result, Some(2));
    }
}
