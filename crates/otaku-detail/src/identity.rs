//! Entry boundary of the detail view: route parsing and primary entity resolution.
//!
//! The primary record only ever arrives through a [`NavigationPayload`]. When the
//! payload is missing the view reports [`PrimaryEntity::NotFound`] without asking the
//! gateway for the record by id.

use otaku_models::{AnimeId, AnimeRecord};
use serde::Serialize;
use thiserror::Error;

const ROUTE_PREFIXES: [&str; 2] = ["/anime/", "/detail/"];

/// Errors raised while parsing a detail route.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// The path does not point at a detail page.
    #[error("'{path}' is not a detail route")]
    UnknownPath {
        /// Path as supplied.
        path: String,
    },
    /// The id segment is not a positive integer.
    #[error("'{segment}' is not a valid anime id")]
    InvalidId {
        /// Offending segment.
        segment: String,
    },
}

/// Parsed `/anime/{id}` route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DetailRoute {
    id: AnimeId,
}

impl DetailRoute {
    /// Route for `id`.
    #[must_use]
    pub const fn new(id: AnimeId) -> Self {
        Self { id }
    }

    /// Parse `/anime/{id}` or `/detail/{id}`, with or without a trailing slash.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError`] for unrelated paths or malformed ids.
    pub fn parse(path: &str) -> Result<Self, RouteError> {
        let trimmed = path.trim();
        let segment = ROUTE_PREFIXES
            .iter()
            .find_map(|prefix| trimmed.strip_prefix(*prefix))
            .ok_or_else(|| RouteError::UnknownPath {
                path: path.to_string(),
            })?;
        let segment = segment.strip_suffix('/').unwrap_or(segment);
        let id = segment
            .parse::<AnimeId>()
            .map_err(|_| RouteError::InvalidId {
                segment: segment.to_string(),
            })?;
        Ok(Self { id })
    }

    /// Identity addressed by the route.
    #[must_use]
    pub const fn id(&self) -> AnimeId {
        self.id
    }

    /// Canonical path for this route.
    #[must_use]
    pub fn path(&self) -> String {
        format!("/anime/{}", self.id)
    }
}

/// In-memory state handed over when navigating from search to detail.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavigationPayload {
    /// Record resolved by the search.
    pub anime: AnimeRecord,
}

impl NavigationPayload {
    /// Wrap a search result.
    #[must_use]
    pub const fn new(anime: AnimeRecord) -> Self {
        Self { anime }
    }

    /// Route the payload navigates to.
    #[must_use]
    pub const fn route(&self) -> DetailRoute {
        DetailRoute::new(self.anime.mal_id)
    }
}

/// Primary entity state of the detail view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "anime", rename_all = "snake_case")]
pub enum PrimaryEntity {
    /// The record arrived with the navigation payload.
    Loaded(AnimeRecord),
    /// No payload was supplied; terminal for this mount.
    NotFound,
}

impl PrimaryEntity {
    /// Id carried by the loaded record, if any.
    #[must_use]
    pub const fn identity(&self) -> Option<AnimeId> {
        match self {
            Self::Loaded(record) => Some(record.mal_id),
            Self::NotFound => None,
        }
    }

    /// Whether the record is present.
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }
}

/// Resolve the primary entity for `route` from an optional payload.
///
/// The payload's record is shown as is even when its id disagrees with the route; the
/// mismatch is logged. Slots are bound to the route id by the caller, never to the record.
#[must_use]
pub fn resolve_primary(route: &DetailRoute, payload: Option<NavigationPayload>) -> PrimaryEntity {
    let Some(payload) = payload else {
        tracing::debug!(anime_id = %route.id(), "no navigation payload; primary entity not found");
        return PrimaryEntity::NotFound;
    };
    if payload.anime.mal_id != route.id() {
        tracing::warn!(
            anime_id = %payload.anime.mal_id,
            route_id = %route.id(),
            "navigation payload does not match route"
        );
    }
    PrimaryEntity::Loaded(payload.anime)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u64) -> AnimeRecord {
        AnimeRecord {
            mal_id: AnimeId(id),
            title: "Death Note".into(),
            episodes: Some(37),
            score: Some(8.62),
            synopsis: None,
            image_url: None,
            year: Some(2006),
            status: None,
        }
    }

    #[test]
    fn parses_both_route_shapes() {
        assert_eq!(DetailRoute::parse("/anime/1535").map(|r| r.id()), Ok(AnimeId(1535)));
        assert_eq!(DetailRoute::parse("/detail/1535/").map(|r| r.id()), Ok(AnimeId(1535)));
        assert_eq!(
            DetailRoute::parse("/detail/1535").map(|r| r.path()),
            Ok("/anime/1535".to_string())
        );
    }

    #[test]
    fn rejects_unrelated_and_malformed_routes() {
        assert!(matches!(
            DetailRoute::parse("/search/1535"),
            Err(RouteError::UnknownPath { .. })
        ));
        assert_eq!(
            DetailRoute::parse("/anime/zero"),
            Err(RouteError::InvalidId {
                segment: "zero".into()
            })
        );
        assert!(DetailRoute::parse("/anime/0").is_err());
        assert!(DetailRoute::parse("/anime/").is_err());
    }

    #[test]
    fn missing_payload_is_not_found() {
        let route = DetailRoute::parse("/detail/1535").expect("route");
        let primary = resolve_primary(&route, None);
        assert_eq!(primary, PrimaryEntity::NotFound);
        assert_eq!(primary.identity(), None);
    }

    #[test]
    fn payload_supplies_the_record() {
        let payload = NavigationPayload::new(record(1535));
        let route = payload.route();
        assert_eq!(route.path(), "/anime/1535");

        let primary = resolve_primary(&route, Some(payload));
        assert!(primary.is_loaded());
        assert_eq!(primary.identity(), Some(AnimeId(1535)));
    }

    #[test]
    fn not_found_serialises_as_tagged_state() {
        let value = serde_json::to_value(PrimaryEntity::NotFound).expect("serialise");
        assert_eq!(value, serde_json::json!({ "state": "not_found" }));
    }
}
