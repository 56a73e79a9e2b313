//! Canned records mirroring what the Otaku Insight API returns.

use otaku_models::{AnimeId, AnimeRecord, EpisodeAnalysisRecord, EpisodeRecord, MangaInfoRecord};

/// Search result for "Death Note" (MAL id 1535).
#[must_use]
pub fn death_note() -> AnimeRecord {
    AnimeRecord {
        mal_id: AnimeId(1535),
        title: "Death Note".into(),
        episodes: Some(37),
        score: Some(8.62),
        synopsis: Some("A shinigami's notebook falls into the hands of a high school student.".into()),
        image_url: Some("https://cdn.myanimelist.net/images/anime/9/9453.jpg".into()),
        year: Some(2006),
        status: Some("Finished Airing".into()),
    }
}

/// Search result for "Attack on Titan" (MAL id 16498).
#[must_use]
pub fn attack_on_titan() -> AnimeRecord {
    AnimeRecord {
        mal_id: AnimeId(16498),
        title: "Shingeki no Kyojin".into(),
        episodes: Some(25),
        score: Some(8.55),
        synopsis: None,
        image_url: None,
        year: Some(2013),
        status: Some("Finished Airing".into()),
    }
}

/// Episode analysis for Death Note.
#[must_use]
pub fn episode_analysis() -> EpisodeAnalysisRecord {
    EpisodeAnalysisRecord {
        anime_name: Some("Death Note".into()),
        total_episodes: 37,
        average_rating: 4.52,
        highest_rated_episode: Some(EpisodeRecord {
            episode_number: Some(25),
            title: Some("Silence".into()),
            rating: 4.9,
        }),
        lowest_rated_episode: Some(EpisodeRecord {
            episode_number: Some(37),
            title: Some("New World".into()),
            rating: 3.8,
        }),
        episodes_above9: 0,
        episodes_above8: 0,
    }
}

/// Manga continuation info for Death Note.
#[must_use]
pub fn manga_info() -> MangaInfoRecord {
    MangaInfoRecord {
        anime_title: Some("Death Note".into()),
        manga_title: "Death Note".into(),
        total_manga_chapters: Some(108),
        total_manga_volumes: Some(12),
        manga_status: Some("Finished".into()),
        continue_from_chapter: Some("The anime covers the whole manga".into()),
        note: None,
    }
}

/// Manga continuation info for Attack on Titan.
#[must_use]
pub fn manga_info_aot() -> MangaInfoRecord {
    MangaInfoRecord {
        anime_title: Some("Shingeki no Kyojin".into()),
        manga_title: "Shingeki no Kyojin".into(),
        total_manga_chapters: Some(141),
        total_manga_volumes: Some(34),
        manga_status: Some("Finished".into()),
        continue_from_chapter: Some("34".into()),
        note: Some("Season 1 ends around chapter 33.".into()),
    }
}
