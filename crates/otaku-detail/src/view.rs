//! Detail view orchestrator.
//!
//! # Design
//! - Owns one driver per secondary slot and the resolved primary entity.
//! - The shell calls explicit transitions (`mount`, `on_identity_change`, `select_tab`,
//!   `teardown`) instead of relying on a rendering lifecycle.
//! - Every mutating call after `teardown` is a logged no-op.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use std::sync::Arc;

use otaku_gateway::AnimeGateway;
use otaku_models::{AnimeId, EpisodeAnalysisRecord, MangaInfoRecord};
use serde::Serialize;
use thiserror::Error;

use crate::config::DetailConfig;
use crate::driver::{EpisodeSlotDriver, MangaSlotDriver};
use crate::guard::SlotWatcher;
use crate::identity::{DetailRoute, NavigationPayload, PrimaryEntity, resolve_primary};
use crate::retry::RetryController;
use crate::scheduler::RetryScheduler;
use crate::slot::{SlotKind, SlotSnapshot};

/// Sections of the detail page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailTab {
    /// Primary record summary.
    #[default]
    Overview,
    /// Episode rating analysis.
    Episodes,
    /// Manga continuation info.
    Manga,
}

impl DetailTab {
    /// Every tab in display order.
    pub const ALL: [Self; 3] = [Self::Overview, Self::Episodes, Self::Manga];

    /// Slot shown by this tab, if any.
    #[must_use]
    pub const fn slot(self) -> Option<SlotKind> {
        match self {
            Self::Overview => None,
            Self::Episodes => Some(SlotKind::EpisodeAnalysis),
            Self::Manga => Some(SlotKind::MangaInfo),
        }
    }

    /// Stable label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Overview => "overview",
            Self::Episodes => "episodes",
            Self::Manga => "manga",
        }
    }
}

impl Display for DetailTab {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Unknown tab label.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown tab '{value}'")]
pub struct ParseTabError {
    /// Label as supplied.
    pub value: String,
}

impl FromStr for DetailTab {
    type Err = ParseTabError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "overview" => Ok(Self::Overview),
            "episodes" => Ok(Self::Episodes),
            "manga" => Ok(Self::Manga),
            _ => Err(ParseTabError {
                value: value.to_string(),
            }),
        }
    }
}

/// Detail page state machine for one mounted view.
///
/// All mutating calls spawn onto the ambient tokio runtime and must run inside it.
pub struct DetailView {
    primary: Option<PrimaryEntity>,
    identity: Option<AnimeId>,
    active_tab: DetailTab,
    episode: EpisodeSlotDriver,
    manga: MangaSlotDriver,
    torn_down: bool,
}

impl DetailView {
    /// Unmounted view fetching through `gateway`; retries wait on `scheduler`.
    #[must_use]
    pub fn new(
        gateway: Arc<dyn AnimeGateway>,
        scheduler: Arc<dyn RetryScheduler>,
        config: DetailConfig,
    ) -> Self {
        let controller = RetryController::new(config.retry, scheduler);
        Self {
            primary: None,
            identity: None,
            active_tab: DetailTab::default(),
            episode: EpisodeSlotDriver::new(Arc::clone(&gateway)),
            manga: MangaSlotDriver::new(gateway, controller),
            torn_down: false,
        }
    }

    /// Resolve the primary entity for `route` and bind both slots to the route's id.
    ///
    /// The payload only supplies the primary record; the slots always follow the route.
    /// Without a payload the primary entity is [`PrimaryEntity::NotFound`] and no slot is bound.
    pub fn mount(
        &mut self,
        route: &DetailRoute,
        payload: Option<NavigationPayload>,
    ) -> Option<&PrimaryEntity> {
        if self.torn_down {
            tracing::debug!(route = %route.path(), "mount ignored after teardown");
            return self.primary.as_ref();
        }
        let primary = resolve_primary(route, payload);
        let old = self.identity;
        let new = primary.is_loaded().then_some(route.id());
        self.primary = Some(primary);
        self.on_identity_change(old, new);
        self.primary.as_ref()
    }

    /// Supersede every activation bound to `old` and bind the slots to `new`.
    ///
    /// The manga slot starts fetching right away; the episode slot only if its tab is showing.
    /// Binding the identity the slots already hold is a no-op whatever `old` says.
    pub fn on_identity_change(&mut self, old: Option<AnimeId>, new: Option<AnimeId>) {
        if self.torn_down {
            tracing::debug!("identity change ignored after teardown");
            return;
        }
        if self.identity == new {
            return;
        }
        if old != self.identity {
            tracing::debug!(
                reported = ?old.map(AnimeId::get),
                bound = ?self.identity.map(AnimeId::get),
                "caller's previous identity differs from the bound one"
            );
        }
        tracing::debug!(
            previous = ?old.map(AnimeId::get),
            anime_id = ?new.map(AnimeId::get),
            "identity changed"
        );
        self.identity = new;
        self.episode.bind(new);
        self.manga.bind(new);
        if self.active_tab == DetailTab::Episodes {
            self.episode.activate();
        }
    }

    /// A slot's section became visible.
    pub fn on_slot_activated(&mut self, kind: SlotKind) {
        if self.torn_down {
            tracing::debug!(slot = %kind, "activation ignored after teardown");
            return;
        }
        match kind {
            SlotKind::EpisodeAnalysis => {
                self.episode.activate();
            }
            SlotKind::MangaInfo => {
                tracing::trace!(slot = %kind, "eager slot needs no activation");
            }
        }
    }

    /// A slot's section was hidden. In-flight fetches keep running.
    pub fn on_slot_deactivated(&mut self, kind: SlotKind) {
        tracing::trace!(slot = %kind, torn_down = self.torn_down, "slot hidden");
    }

    /// Switch the visible tab, activating or deactivating slots as needed.
    pub fn select_tab(&mut self, tab: DetailTab) {
        if self.torn_down {
            tracing::debug!(tab = %tab, "tab change ignored after teardown");
            return;
        }
        let previous = std::mem::replace(&mut self.active_tab, tab);
        if previous == tab {
            return;
        }
        if let Some(kind) = previous.slot() {
            self.on_slot_deactivated(kind);
        }
        if let Some(kind) = tab.slot() {
            self.on_slot_activated(kind);
        }
    }

    /// Unmount: cancel every activation. Idempotent.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.episode.close();
        self.manga.close();
        tracing::debug!(
            anime_id = ?self.identity.map(AnimeId::get),
            "detail view torn down"
        );
    }

    /// Whether [`teardown`](Self::teardown) has run.
    #[must_use]
    pub const fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Resolved primary entity, once mounted.
    #[must_use]
    pub const fn primary(&self) -> Option<&PrimaryEntity> {
        self.primary.as_ref()
    }

    /// Identity the slots are bound to.
    #[must_use]
    pub const fn identity(&self) -> Option<AnimeId> {
        self.identity
    }

    /// Currently visible tab.
    #[must_use]
    pub const fn active_tab(&self) -> DetailTab {
        self.active_tab
    }

    /// Episode-analysis slot state.
    #[must_use]
    pub fn episode_snapshot(&self) -> SlotSnapshot<EpisodeAnalysisRecord> {
        self.episode.snapshot()
    }

    /// Manga-info slot state.
    #[must_use]
    pub fn manga_snapshot(&self) -> SlotSnapshot<MangaInfoRecord> {
        self.manga.snapshot()
    }

    /// Episode fetches started for the bound identity.
    #[must_use]
    pub fn episode_attempt(&self) -> u32 {
        self.episode.attempt()
    }

    /// Manga attempts issued for the bound identity, retries included.
    #[must_use]
    pub fn manga_attempt(&self) -> u32 {
        self.manga.attempt()
    }

    /// Watch episode-analysis slot changes.
    #[must_use]
    pub fn subscribe_episode(&self) -> SlotWatcher<EpisodeAnalysisRecord> {
        self.episode.subscribe()
    }

    /// Watch manga-info slot changes.
    #[must_use]
    pub fn subscribe_manga(&self) -> SlotWatcher<MangaInfoRecord> {
        self.manga.subscribe()
    }
}

impl Drop for DetailView {
    fn drop(&mut self) {
        self.teardown();
    }
}
