//! Fetch state machine for a single secondary dataset.
//!
//! # Design
//! - `Idle -> Loading -> (Success | Error)`, one direction per identity.
//! - A retry keeps the slot in `Loading` and bumps `attempt`; nothing returns to `Idle`.
//! - The shell only ever sees [`SlotSnapshot`] values.

use std::fmt::{self, Display, Formatter};

use otaku_models::AnimeId;
use serde::Serialize;
use thiserror::Error;

/// Secondary dataset kinds shown by the detail view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotKind {
    /// Episode rating analysis.
    EpisodeAnalysis,
    /// Manga adaptation info.
    MangaInfo,
}

impl SlotKind {
    /// Stable label used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EpisodeAnalysis => "episode_analysis",
            Self::MangaInfo => "manga_info",
        }
    }
}

impl Display for SlotKind {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Lifecycle position of a slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchStatus {
    /// No fetch attempted yet.
    Idle,
    /// An attempt is in flight.
    Loading,
    /// Terminal; holds a result.
    Success,
    /// Terminal; holds an error message.
    Error,
}

impl FetchStatus {
    /// Whether no further transition is possible for the current identity.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Error)
    }

    /// Stable label used in logs and rendering.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

impl Display for FetchStatus {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Rejected state machine transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("illegal {kind} transition from {from} on {event}")]
pub struct TransitionError {
    /// Slot the transition was attempted on.
    pub kind: SlotKind,
    /// Status at the time of the attempt.
    pub from: FetchStatus,
    /// Transition that was requested.
    pub event: &'static str,
}

/// Mutable state of one slot for one identity.
#[derive(Clone, Debug, PartialEq)]
pub struct FetchSlot<T> {
    kind: SlotKind,
    status: FetchStatus,
    result: Option<T>,
    error_message: Option<String>,
    attempt: u32,
    fetched_once_for: Option<AnimeId>,
}

impl<T> FetchSlot<T> {
    /// Fresh idle slot.
    #[must_use]
    pub const fn new(kind: SlotKind) -> Self {
        Self {
            kind,
            status: FetchStatus::Idle,
            result: None,
            error_message: None,
            attempt: 0,
            fetched_once_for: None,
        }
    }

    /// Dataset this slot holds.
    #[must_use]
    pub const fn kind(&self) -> SlotKind {
        self.kind
    }

    /// Current lifecycle status.
    #[must_use]
    pub const fn status(&self) -> FetchStatus {
        self.status
    }

    /// Result once the slot succeeded.
    #[must_use]
    pub const fn result(&self) -> Option<&T> {
        self.result.as_ref()
    }

    /// Message once the slot failed.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Number of attempts started for the current identity.
    #[must_use]
    pub const fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Identity a single-shot fetch was already issued for.
    #[must_use]
    pub const fn fetched_once_for(&self) -> Option<AnimeId> {
        self.fetched_once_for
    }

    /// Record that the single-shot fetch for `identity` has been issued.
    pub fn mark_fetched(&mut self, identity: AnimeId) {
        self.fetched_once_for = Some(identity);
    }

    /// Start an attempt: `Idle -> Loading`, or a retry within `Loading`.
    ///
    /// Returns the attempt number that was started.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError`] when the slot is already terminal.
    pub fn begin_attempt(&mut self) -> Result<u32, TransitionError> {
        match self.status {
            FetchStatus::Idle | FetchStatus::Loading => {
                self.status = FetchStatus::Loading;
                self.attempt = self.attempt.saturating_add(1);
                Ok(self.attempt)
            }
            from => Err(self.illegal(from, "begin_attempt")),
        }
    }

    /// `Loading -> Success`.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError`] unless an attempt is in flight.
    pub fn succeed(&mut self, value: T) -> Result<(), TransitionError> {
        if self.status != FetchStatus::Loading {
            return Err(self.illegal(self.status, "succeed"));
        }
        self.status = FetchStatus::Success;
        self.result = Some(value);
        self.error_message = None;
        Ok(())
    }

    /// `Loading -> Error`.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError`] unless an attempt is in flight.
    pub fn fail(&mut self, message: impl Into<String>) -> Result<(), TransitionError> {
        if self.status != FetchStatus::Loading {
            return Err(self.illegal(self.status, "fail"));
        }
        self.status = FetchStatus::Error;
        self.result = None;
        self.error_message = Some(message.into());
        Ok(())
    }

    const fn illegal(&self, from: FetchStatus, event: &'static str) -> TransitionError {
        TransitionError {
            kind: self.kind,
            from,
            event,
        }
    }
}

impl<T: Clone> FetchSlot<T> {
    /// Read-only view handed to the presentation shell.
    #[must_use]
    pub fn snapshot(&self) -> SlotSnapshot<T> {
        SlotSnapshot {
            status: self.status,
            result: self.result.clone(),
            error_message: self.error_message.clone(),
        }
    }
}

/// Read-only slot state consumed by the presentation shell.
///
/// `Loading` means show progress, `Error` means show the message without a retry
/// control, `Success` means render the result.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SlotSnapshot<T> {
    /// Lifecycle status.
    pub status: FetchStatus,
    /// Result when `status` is `Success`.
    pub result: Option<T>,
    /// Message when `status` is `Error`.
    pub error_message: Option<String>,
}
