use std::sync::Arc;

use otaku_detail::{
    DetailConfig, DetailRoute, DetailTab, DetailView, FetchStatus, NavigationPayload,
    PrimaryEntity, SearchError, TokioScheduler, search,
};
use otaku_models::AnimeId;
use otaku_test_support::{ScriptedGateway, fixtures};

fn view(gateway: &Arc<ScriptedGateway>) -> DetailView {
    DetailView::new(
        gateway.clone(),
        Arc::new(TokioScheduler),
        DetailConfig::default(),
    )
}

#[tokio::test(start_paused = true)]
async fn direct_navigation_without_payload_is_not_found() -> anyhow::Result<()> {
    let gateway = Arc::new(ScriptedGateway::new());
    gateway.search.push_ok(fixtures::death_note());

    let payload = search(gateway.as_ref(), "Death Note").await?;
    assert_eq!(payload.anime.mal_id, AnimeId(1535));

    let mut detail = view(&gateway);
    let route = DetailRoute::parse("/detail/1535")?;
    assert_eq!(route.id(), payload.route().id());

    let primary = detail.mount(&route, None).cloned();
    assert_eq!(primary, Some(PrimaryEntity::NotFound));
    detail.select_tab(DetailTab::Episodes);
    tokio::time::sleep(std::time::Duration::from_secs(5)).await;

    assert_eq!(detail.identity(), None);
    assert_eq!(detail.episode_snapshot().status, FetchStatus::Idle);
    assert_eq!(detail.manga_snapshot().status, FetchStatus::Idle);
    assert_eq!(gateway.episodes.call_count(), 0);
    assert_eq!(gateway.manga.call_count(), 0);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn search_then_navigate_with_payload_loads_everything() -> anyhow::Result<()> {
    let gateway = Arc::new(ScriptedGateway::new());
    gateway.search.push_ok(fixtures::death_note());
    gateway.episodes.push_ok(fixtures::episode_analysis());
    gateway.manga.push_ok(fixtures::manga_info());

    let payload = search(gateway.as_ref(), "Death Note").await?;
    let mut detail = view(&gateway);
    let route = payload.route();
    let primary = detail.mount(&route, Some(payload)).cloned();
    assert!(matches!(primary, Some(PrimaryEntity::Loaded(ref anime)) if anime.title == "Death Note"));

    detail.select_tab(DetailTab::Episodes);
    let episodes = detail.subscribe_episode().settled().await;
    let manga = detail.subscribe_manga().settled().await;
    assert_eq!(episodes.result, Some(fixtures::episode_analysis()));
    assert_eq!(manga.result, Some(fixtures::manga_info()));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn slots_follow_the_route_when_the_payload_disagrees() -> anyhow::Result<()> {
    let gateway = Arc::new(ScriptedGateway::new());
    gateway.episodes.push_ok(fixtures::episode_analysis());
    gateway.manga.push_ok(fixtures::manga_info_aot());

    let mut detail = view(&gateway);
    let route = DetailRoute::parse("/detail/16498")?;
    let payload = NavigationPayload::new(fixtures::death_note());
    let primary = detail.mount(&route, Some(payload)).cloned();
    assert!(matches!(primary, Some(PrimaryEntity::Loaded(ref anime)) if anime.mal_id == AnimeId(1535)));
    assert_eq!(detail.identity(), Some(AnimeId(16498)));

    detail.select_tab(DetailTab::Episodes);
    detail.subscribe_episode().settled().await;
    let manga = detail.subscribe_manga().settled().await;

    assert_eq!(gateway.episodes.calls(), vec![AnimeId(16498)]);
    assert_eq!(gateway.manga.calls(), vec![AnimeId(16498)]);
    assert_eq!(manga.result, Some(fixtures::manga_info_aot()));
    Ok(())
}

#[tokio::test]
async fn unknown_title_surfaces_the_search_message() {
    let gateway = ScriptedGateway::new();
    let err = search(&gateway, "Definitely Not An Anime")
        .await
        .expect_err("unscripted search misses");
    assert_eq!(
        err,
        SearchError::NotFound {
            query: "Definitely Not An Anime".into()
        }
    );
    assert_eq!(err.user_message(), "No results found. Try a different title.");
}
