//! Per-slot drivers that decide when a fetch starts and route outcomes through the guard.
//!
//! # Design
//! - Episode analysis is lazy-once: the first activation for an identity issues the
//!   single fetch; failures are terminal.
//! - Manga info is eager: binding an identity immediately starts a retried fetch.
//! - Every continuation carries the activation token captured at bind time.

use std::sync::Arc;

use otaku_gateway::AnimeGateway;
use otaku_models::{AnimeId, EpisodeAnalysisRecord, MangaInfoRecord};

use crate::guard::{Applied, GuardedSlot, SlotWatcher};
use crate::retry::{RetryController, RetryOutcome};
use crate::slot::{FetchSlot, SlotKind, SlotSnapshot};
use crate::token::ActivationToken;

/// Message shown when the single episode-analysis fetch fails.
pub const EPISODE_ERROR_MESSAGE: &str = "Could not load episode data.";
/// Message shown once every manga-info attempt has failed.
pub const MANGA_ERROR_MESSAGE: &str = "No manga adaptation found for this anime.";

fn log_outcome<R>(kind: SlotKind, anime_id: AnimeId, event: &'static str, applied: &Applied<R>) {
    match applied {
        Applied::Done(_) => {}
        Applied::Stale => tracing::debug!(
            anime_id = %anime_id,
            slot = %kind,
            event,
            "stale outcome discarded"
        ),
        Applied::Rejected(err) => tracing::warn!(
            anime_id = %anime_id,
            slot = %kind,
            error = %err,
            "slot refused transition"
        ),
    }
}

/// Lazy-once driver for the episode-analysis slot.
pub struct EpisodeSlotDriver {
    gateway: Arc<dyn AnimeGateway>,
    slot: Arc<GuardedSlot<EpisodeAnalysisRecord>>,
    identity: Option<AnimeId>,
    token: ActivationToken,
}

impl EpisodeSlotDriver {
    /// Unbound driver fetching through `gateway`.
    #[must_use]
    pub fn new(gateway: Arc<dyn AnimeGateway>) -> Self {
        let slot = Arc::new(GuardedSlot::new(SlotKind::EpisodeAnalysis));
        let token = slot.current_token();
        Self {
            gateway,
            slot,
            identity: None,
            token,
        }
    }

    /// Point the driver at `identity`, superseding whatever it held before.
    ///
    /// Nothing is fetched until [`activate`](Self::activate).
    pub fn bind(&mut self, identity: Option<AnimeId>) {
        self.token = self.slot.reset();
        self.identity = identity;
    }

    /// The section became visible. Issues the fetch the first time per identity.
    ///
    /// Returns whether a fetch was started. Must be called within a tokio runtime.
    pub fn activate(&self) -> bool {
        let Some(anime_id) = self.identity else {
            return false;
        };
        let started = self.slot.apply(&self.token, |slot| {
            if slot.fetched_once_for() == Some(anime_id) {
                return Ok(false);
            }
            slot.begin_attempt()?;
            slot.mark_fetched(anime_id);
            Ok(true)
        });
        if !matches!(started, Applied::Done(true)) {
            log_outcome(SlotKind::EpisodeAnalysis, anime_id, "activate", &started);
            return false;
        }

        tracing::debug!(
            anime_id = %anime_id,
            slot = %SlotKind::EpisodeAnalysis,
            attempt = 1,
            "fetch started"
        );
        let gateway = Arc::clone(&self.gateway);
        let slot = Arc::clone(&self.slot);
        let token = self.token.clone();
        tokio::spawn(async move {
            let result = gateway.fetch_episode_analysis(anime_id).await;
            let applied = match result {
                Ok(record) => slot.apply(&token, |s| s.succeed(record)),
                Err(err) => {
                    tracing::warn!(
                        anime_id = %anime_id,
                        slot = %SlotKind::EpisodeAnalysis,
                        error = %err,
                        "episode analysis fetch failed"
                    );
                    slot.apply(&token, |s| s.fail(EPISODE_ERROR_MESSAGE))
                }
            };
            log_outcome(SlotKind::EpisodeAnalysis, anime_id, "complete", &applied);
        });
        true
    }

    /// Cancel the current activation for good.
    pub fn close(&self) {
        self.slot.close();
    }

    /// Identity currently bound.
    #[must_use]
    pub const fn identity(&self) -> Option<AnimeId> {
        self.identity
    }

    /// Fetches started for the bound identity: zero or one.
    #[must_use]
    pub fn attempt(&self) -> u32 {
        self.slot.attempt()
    }

    /// Copy of the slot state.
    #[must_use]
    pub fn snapshot(&self) -> SlotSnapshot<EpisodeAnalysisRecord> {
        self.slot.snapshot()
    }

    /// Read-only subscription to slot changes.
    #[must_use]
    pub fn subscribe(&self) -> SlotWatcher<EpisodeAnalysisRecord> {
        self.slot.subscribe()
    }
}

/// Eager driver for the manga-info slot, retried through a [`RetryController`].
pub struct MangaSlotDriver {
    gateway: Arc<dyn AnimeGateway>,
    controller: RetryController,
    slot: Arc<GuardedSlot<MangaInfoRecord>>,
    identity: Option<AnimeId>,
}

impl MangaSlotDriver {
    /// Unbound driver fetching through `gateway` with `controller`'s policy.
    #[must_use]
    pub fn new(gateway: Arc<dyn AnimeGateway>, controller: RetryController) -> Self {
        Self {
            gateway,
            controller,
            slot: Arc::new(GuardedSlot::new(SlotKind::MangaInfo)),
            identity: None,
        }
    }

    /// Point the driver at `identity` and start fetching right away.
    ///
    /// `None` only cancels the previous activation. Must be called within a tokio runtime.
    pub fn bind(&mut self, identity: Option<AnimeId>) {
        let token = self.slot.reset();
        self.identity = identity;
        let Some(anime_id) = identity else {
            return;
        };
        if token.is_cancelled() {
            return;
        }

        tracing::debug!(
            anime_id = %anime_id,
            slot = %SlotKind::MangaInfo,
            max_attempts = self.controller.policy().max_attempts(),
            "fetch started"
        );
        let gateway = Arc::clone(&self.gateway);
        let controller = self.controller.clone();
        let slot = Arc::clone(&self.slot);
        tokio::spawn(async move {
            let outcome = controller
                .run(
                    &token,
                    || gateway.fetch_manga_info(anime_id),
                    |attempt| {
                        let applied = slot.apply(&token, FetchSlot::begin_attempt);
                        if let Applied::Done(_) = applied {
                            tracing::debug!(
                                anime_id = %anime_id,
                                slot = %SlotKind::MangaInfo,
                                attempt,
                                "attempt issued"
                            );
                        } else {
                            log_outcome(SlotKind::MangaInfo, anime_id, "attempt", &applied);
                        }
                    },
                )
                .await;

            let applied = match outcome {
                RetryOutcome::Success { value, .. } => slot.apply(&token, |s| s.succeed(value)),
                RetryOutcome::Exhausted { error, attempts } => {
                    tracing::warn!(
                        anime_id = %anime_id,
                        slot = %SlotKind::MangaInfo,
                        attempt = attempts,
                        error = %error,
                        "manga info retries exhausted"
                    );
                    slot.apply(&token, |s| s.fail(MANGA_ERROR_MESSAGE))
                }
                RetryOutcome::Cancelled { attempts } => {
                    tracing::debug!(
                        anime_id = %anime_id,
                        slot = %SlotKind::MangaInfo,
                        attempt = attempts,
                        "retry chain abandoned"
                    );
                    return;
                }
            };
            log_outcome(SlotKind::MangaInfo, anime_id, "complete", &applied);
        });
    }

    /// Cancel the current activation for good.
    pub fn close(&self) {
        self.slot.close();
    }

    /// Identity currently bound.
    #[must_use]
    pub const fn identity(&self) -> Option<AnimeId> {
        self.identity
    }

    /// Attempts issued for the bound identity, never above the policy's maximum.
    #[must_use]
    pub fn attempt(&self) -> u32 {
        self.slot.attempt()
    }

    /// Copy of the slot state.
    #[must_use]
    pub fn snapshot(&self) -> SlotSnapshot<MangaInfoRecord> {
        self.slot.snapshot()
    }

    /// Read-only subscription to slot changes.
    #[must_use]
    pub fn subscribe(&self) -> SlotWatcher<MangaInfoRecord> {
        self.slot.subscribe()
    }
}
