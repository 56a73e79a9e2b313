//! `otaku detail`: search, mount the detail view with the payload, and wait for its slots.

use std::sync::Arc;

use otaku_detail::{DetailTab, DetailView, NavigationPayload, TokioScheduler};
use tracing::debug;

use crate::cli::{DetailArgs, OutputFormat, TabArg};
use crate::client::{AppContext, CliResult};
use crate::commands::search::resolve;
use crate::output::{DetailReport, render_detail};

pub(crate) async fn handle_detail(
    ctx: &AppContext,
    args: &DetailArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let payload = resolve(ctx, &args.query()).await?;
    let report = load_detail(ctx, payload, args.tab).await;
    print!("{}", render_detail(&report, format)?);
    Ok(())
}

/// Visit the requested tabs and capture every activated slot once it is terminal.
pub(crate) async fn load_detail(
    ctx: &AppContext,
    payload: NavigationPayload,
    tab: TabArg,
) -> DetailReport {
    let route = payload.route();
    let mut view = DetailView::new(Arc::clone(&ctx.gateway), Arc::new(TokioScheduler), ctx.detail);
    view.mount(&route, Some(payload));

    let tabs = tab.tabs();
    debug!(route = %route.path(), ?tabs, "visiting detail tabs");
    for tab in &tabs {
        view.select_tab(*tab);
    }

    let episodes = if tabs.contains(&DetailTab::Episodes) {
        Some(view.subscribe_episode().settled().await)
    } else {
        None
    };
    let manga = if tabs.contains(&DetailTab::Manga) {
        Some(view.subscribe_manga().settled().await)
    } else {
        None
    };

    let report = DetailReport {
        route: route.path(),
        primary: view.primary().cloned(),
        episodes,
        manga,
    };
    view.teardown();
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::open::open_route;
    use anyhow::Result;
    use httpmock::MockServer;
    use httpmock::prelude::*;
    use otaku_detail::{DetailConfig, FetchStatus, MANGA_ERROR_MESSAGE, PrimaryEntity, RetryPolicy};
    use otaku_gateway::{GatewayConfig, HttpGateway};
    use serde_json::json;
    use std::time::Duration;

    fn context(server: &MockServer, retry: RetryPolicy) -> Result<AppContext> {
        let config = GatewayConfig {
            base_url: format!("{}/api", server.base_url()).parse()?,
            ..GatewayConfig::default()
        };
        Ok(AppContext {
            gateway: Arc::new(HttpGateway::new(&config)?),
            detail: DetailConfig { retry },
        })
    }

    fn fast_retry() -> RetryPolicy {
        RetryPolicy {
            max_retries: 2,
            base_delay: Duration::from_millis(5),
        }
    }

    fn mock_search(server: &MockServer) -> httpmock::Mock<'_> {
        server.mock(|when, then| {
            when.method(GET)
                .path("/api/anime/search")
                .query_param("name", "Death Note");
            then.status(200).json_body(json!({
                "malId": 1535,
                "title": "Death Note",
                "episodes": 37,
                "score": 8.62
            }));
        })
    }

    #[tokio::test]
    async fn detail_loads_both_slots_over_http() -> Result<()> {
        let server = MockServer::start_async().await;
        let search = mock_search(&server);
        let episodes = server.mock(|when, then| {
            when.method(GET).path("/api/anime/1535/episodes/analysis");
            then.status(200).json_body(json!({
                "totalEpisodes": 37,
                "averageRating": 4.52,
                "episodesAbove9": 0,
                "episodesAbove8": 0
            }));
        });
        let manga = server.mock(|when, then| {
            when.method(GET).path("/api/anime/1535/manga-info");
            then.status(200).json_body(json!({
                "mangaTitle": "Death Note",
                "totalMangaChapters": 108,
                "mangaStatus": "Finished"
            }));
        });

        let ctx = context(&server, fast_retry())?;
        let payload = resolve(&ctx, "Death Note")
            .await
            .map_err(|err| anyhow::anyhow!(err.display_message()))?;
        let report = load_detail(&ctx, payload, TabArg::All).await;

        search.assert();
        episodes.assert();
        manga.assert();
        assert!(matches!(report.primary, Some(PrimaryEntity::Loaded(_))));
        let episode_state = report.episodes.expect("episodes requested");
        assert_eq!(episode_state.status, FetchStatus::Success);
        let manga_state = report.manga.expect("manga requested");
        assert_eq!(
            manga_state.result.map(|info| info.manga_title),
            Some("Death Note".to_string())
        );
        Ok(())
    }

    #[tokio::test]
    async fn manga_not_found_is_retried_then_reported() -> Result<()> {
        let server = MockServer::start_async().await;
        let _search = mock_search(&server);
        let manga = server.mock(|when, then| {
            when.method(GET).path("/api/anime/1535/manga-info");
            then.status(404);
        });

        let ctx = context(&server, fast_retry())?;
        let payload = resolve(&ctx, "Death Note")
            .await
            .map_err(|err| anyhow::anyhow!(err.display_message()))?;
        let report = load_detail(&ctx, payload, TabArg::Manga).await;

        manga.assert_hits(3);
        assert!(report.episodes.is_none());
        let state = report.manga.expect("manga requested");
        assert_eq!(state.status, FetchStatus::Error);
        assert_eq!(state.error_message.as_deref(), Some(MANGA_ERROR_MESSAGE));
        Ok(())
    }

    #[tokio::test]
    async fn unknown_title_is_a_validation_error() -> Result<()> {
        let server = MockServer::start_async().await;
        let _miss = server.mock(|when, then| {
            when.method(GET).path("/api/anime/search");
            then.status(404);
        });

        let ctx = context(&server, fast_retry())?;
        let err = resolve(&ctx, "Nothing").await.err().expect("search misses");
        assert_eq!(err.exit_code(), 2);
        assert_eq!(err.display_message(), "No results found. Try a different title.");
        Ok(())
    }

    #[tokio::test]
    async fn open_without_payload_never_calls_the_api() -> Result<()> {
        let server = MockServer::start_async().await;
        let episodes = server.mock(|when, then| {
            when.method(GET).path("/api/anime/1535/episodes/analysis");
            then.status(500);
        });
        let manga = server.mock(|when, then| {
            when.method(GET).path("/api/anime/1535/manga-info");
            then.status(500);
        });

        let ctx = context(&server, fast_retry())?;
        let report = open_route(&ctx, "/detail/1535")
            .map_err(|err| anyhow::anyhow!(err.display_message()))?;

        assert_eq!(report.primary, Some(PrimaryEntity::NotFound));
        assert_eq!(report.route, "/anime/1535");
        episodes.assert_hits(0);
        manga.assert_hits(0);

        let err = open_route(&ctx, "/search").err().expect("not a detail route");
        assert_eq!(err.exit_code(), 2);
        Ok(())
    }
}
