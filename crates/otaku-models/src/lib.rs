#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    clippy::all,
    clippy::pedantic,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls
)]
#![warn(missing_docs, unreachable_pub)]
//! Shared wire records for the Otaku Insight API.
//!
//! The records mirror the JSON documents served by the backend (camelCase keys)
//! and are consumed by the gateway, the detail orchestration core and the CLI.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// MyAnimeList identifier used as the identity of a detail view.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct AnimeId(pub u64);

impl AnimeId {
    /// Raw numeric identifier.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl Display for AnimeId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl From<u64> for AnimeId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Failure raised when an anime identifier cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid anime id '{value}'")]
pub struct ParseAnimeIdError {
    /// Rejected input.
    pub value: String,
}

impl FromStr for AnimeId {
    type Err = ParseAnimeIdError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        match trimmed.parse::<u64>() {
            Ok(value) if value > 0 => Ok(Self(value)),
            _ => Err(ParseAnimeIdError {
                value: raw.to_string(),
            }),
        }
    }
}

/// Primary entity returned by a name search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnimeRecord {
    /// MyAnimeList identifier.
    pub mal_id: AnimeId,
    /// Display title.
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Episode count when known.
    pub episodes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Community score (0-10).
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Synopsis text.
    pub synopsis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Poster image URL.
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// First airing year.
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Airing status label (e.g. "Finished Airing").
    pub status: Option<String>,
}

impl AnimeRecord {
    /// Score formatted with one decimal, or a dash when unrated.
    #[must_use]
    pub fn display_score(&self) -> String {
        self.score
            .map_or_else(|| "-".to_string(), |score| format!("{score:.1}"))
    }
}

/// A single rated episode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Episode number within the series.
    pub episode_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Episode title.
    pub title: Option<String>,
    /// Normalised rating (0-10).
    pub rating: f64,
}

/// Aggregate rating analysis for every episode of an anime.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeAnalysisRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Anime title the analysis was computed for.
    pub anime_name: Option<String>,
    /// Number of rated episodes.
    pub total_episodes: u32,
    /// Mean rating across rated episodes.
    pub average_rating: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Best rated episode.
    pub highest_rated_episode: Option<EpisodeRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Worst rated episode.
    pub lowest_rated_episode: Option<EpisodeRecord>,
    #[serde(rename = "episodesAbove9")]
    /// Episodes rated 9.0 or higher.
    pub episodes_above9: u64,
    #[serde(rename = "episodesAbove8")]
    /// Episodes rated 8.0 or higher.
    pub episodes_above8: u64,
}

impl EpisodeAnalysisRecord {
    /// Percentage (0-100) of episodes counted in `above`, zero when there are no episodes.
    #[must_use]
    pub fn share_above(&self, above: u64) -> f64 {
        if self.total_episodes == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let share = above as f64 / f64::from(self.total_episodes) * 100.0;
        share.clamp(0.0, 100.0)
    }
}

/// Manga adaptation details for an anime.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MangaInfoRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Anime title the manga was resolved from.
    pub anime_title: Option<String>,
    /// Manga title.
    pub manga_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Chapter count, absent while the manga is ongoing.
    pub total_manga_chapters: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Volume count, absent while the manga is ongoing.
    pub total_manga_volumes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Publication status label.
    pub manga_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Where to pick up the manga after the anime.
    pub continue_from_chapter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Free-form adaptation note.
    pub note: Option<String>,
}
