//! Output renderers and formatting helpers for CLI commands.

use std::fmt::Write as _;

use anyhow::anyhow;
use otaku_detail::{FetchStatus, NavigationPayload, PrimaryEntity, SlotSnapshot};
use otaku_models::{AnimeRecord, EpisodeAnalysisRecord, EpisodeRecord, MangaInfoRecord};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::client::{CliError, CliResult};

const NOT_FOUND_MESSAGE: &str = "Anime data not found";

/// Everything the detail command observed before tearing the view down.
#[derive(Debug, Serialize)]
pub(crate) struct DetailReport {
    pub(crate) route: String,
    pub(crate) primary: Option<PrimaryEntity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) episodes: Option<SlotSnapshot<EpisodeAnalysisRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) manga: Option<SlotSnapshot<MangaInfoRecord>>,
}

fn to_json<T: Serialize>(value: &T) -> CliResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))
}

pub(crate) fn render_search(payload: &NavigationPayload, format: OutputFormat) -> CliResult<String> {
    match format {
        OutputFormat::Json => to_json(payload),
        OutputFormat::Table => {
            let mut out = String::new();
            write_anime(&mut out, &payload.anime);
            let _ = writeln!(out, "route: {}", payload.route().path());
            Ok(out)
        }
    }
}

pub(crate) fn render_detail(report: &DetailReport, format: OutputFormat) -> CliResult<String> {
    if format == OutputFormat::Json {
        return to_json(report);
    }

    let mut out = String::new();
    let _ = writeln!(out, "route: {}", report.route);
    match &report.primary {
        Some(PrimaryEntity::Loaded(anime)) => write_anime(&mut out, anime),
        Some(PrimaryEntity::NotFound) | None => {
            let _ = writeln!(out, "{NOT_FOUND_MESSAGE}");
        }
    }
    if let Some(snapshot) = &report.episodes {
        let _ = writeln!(out, "\n[episodes]");
        write_slot(&mut out, snapshot, write_episodes);
    }
    if let Some(snapshot) = &report.manga {
        let _ = writeln!(out, "\n[manga]");
        write_slot(&mut out, snapshot, write_manga);
    }
    Ok(out)
}

fn write_slot<T>(out: &mut String, snapshot: &SlotSnapshot<T>, body: fn(&mut String, &T)) {
    match (snapshot.status, &snapshot.result) {
        (FetchStatus::Success, Some(result)) => body(out, result),
        (FetchStatus::Error, _) => {
            let message = snapshot.error_message.as_deref().unwrap_or("request failed");
            let _ = writeln!(out, "error: {message}");
        }
        (status, _) => {
            let _ = writeln!(out, "status: {status}");
        }
    }
}

fn write_anime(out: &mut String, anime: &AnimeRecord) {
    let _ = writeln!(out, "id: {}", anime.mal_id);
    let _ = writeln!(out, "title: {}", anime.title);
    let _ = writeln!(out, "score: {}", anime.display_score());
    if let Some(episodes) = anime.episodes {
        let _ = writeln!(out, "episodes: {episodes}");
    }
    if let Some(year) = anime.year {
        let _ = writeln!(out, "year: {year}");
    }
    if let Some(status) = &anime.status {
        let _ = writeln!(out, "status: {status}");
    }
}

fn write_episodes(out: &mut String, data: &EpisodeAnalysisRecord) {
    let _ = writeln!(out, "total episodes: {}", data.total_episodes);
    let _ = writeln!(out, "average rating: {:.2}", data.average_rating);
    let _ = writeln!(
        out,
        "above 9.0: {} ({:.0}%)",
        data.episodes_above9,
        data.share_above(data.episodes_above9)
    );
    let _ = writeln!(
        out,
        "above 8.0: {} ({:.0}%)",
        data.episodes_above8,
        data.share_above(data.episodes_above8)
    );
    if let Some(best) = &data.highest_rated_episode {
        let _ = writeln!(out, "highest: {}", describe_episode(best));
    }
    if let Some(worst) = &data.lowest_rated_episode {
        let _ = writeln!(out, "lowest: {}", describe_episode(worst));
    }
}

fn describe_episode(episode: &EpisodeRecord) -> String {
    let number = episode
        .episode_number
        .map_or_else(|| "?".to_string(), |number| number.to_string());
    let title = episode.title.as_deref().unwrap_or("<untitled>");
    format!("episode {number} {title} ({:.2})", episode.rating)
}

fn write_manga(out: &mut String, data: &MangaInfoRecord) {
    let _ = writeln!(out, "manga: {}", data.manga_title);
    if let Some(status) = &data.manga_status {
        let _ = writeln!(out, "status: {status}");
    }
    let chapters = data
        .total_manga_chapters
        .map_or_else(|| "-".to_string(), |count| count.to_string());
    let volumes = data
        .total_manga_volumes
        .map_or_else(|| "-".to_string(), |count| count.to_string());
    let _ = writeln!(out, "chapters: {chapters} / volumes: {volumes}");
    if let Some(chapter) = &data.continue_from_chapter {
        let _ = writeln!(out, "continue from: {chapter}");
    }
    if let Some(note) = &data.note {
        let _ = writeln!(out, "note: {note}");
    }
}
