#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    clippy::all,
    clippy::pedantic,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls
)]
#![warn(missing_docs, unreachable_pub)]
//! Remote data gateway for the Otaku Insight API.
//!
//! Layout:
//! - `lib.rs`: the [`AnimeGateway`] seam consumed by the detail orchestration core
//! - `error.rs`: gateway error taxonomy
//! - `config.rs`: base URL and timeout configuration
//! - `http.rs`: reqwest-backed implementation

pub mod config;
pub mod error;
pub mod http;

use async_trait::async_trait;
use otaku_models::{AnimeId, AnimeRecord, EpisodeAnalysisRecord, MangaInfoRecord};

pub use config::{ConfigError, GatewayConfig};
pub use error::{Endpoint, GatewayError, GatewayResult};
pub use http::HttpGateway;

/// Read operations offered by the remote API.
///
/// Every call is a single request/response. Implementations must not retry;
/// retry policy belongs to the caller.
#[async_trait]
pub trait AnimeGateway: Send + Sync {
    /// Resolve the best match for a free-text title.
    ///
    /// Fails with [`GatewayError::NotFound`] when nothing matches.
    async fn search_by_name(&self, name: &str) -> GatewayResult<AnimeRecord>;

    /// Fetch the episode rating analysis for an anime.
    async fn fetch_episode_analysis(&self, id: AnimeId) -> GatewayResult<EpisodeAnalysisRecord>;

    /// Fetch the manga adaptation details for an anime.
    ///
    /// The backend intermittently reports not-found for valid ids; those surface
    /// as [`GatewayError::Request`] so callers can treat them as transient.
    async fn fetch_manga_info(&self, id: AnimeId) -> GatewayResult<MangaInfoRecord>;
}
