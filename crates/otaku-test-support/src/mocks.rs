//! Scripted in-memory gateway.
//!
//! Each endpoint owns a [`Script`]: a queue of canned outcomes consumed one per call.
//! A step can also be *held* so the call stays in flight until the test releases it,
//! which lets suites force any completion order between overlapping requests.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use otaku_gateway::{AnimeGateway, Endpoint, GatewayError, GatewayResult};
use otaku_models::{AnimeId, AnimeRecord, EpisodeAnalysisRecord, MangaInfoRecord};
use tokio::sync::{oneshot, watch};

enum Step<T> {
    Ready(GatewayResult<T>),
    Held(oneshot::Receiver<GatewayResult<T>>),
}

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Canned outcomes and call log for one endpoint, keyed by request argument `K`.
pub struct Script<K, T> {
    endpoint: Endpoint,
    unscripted: fn(&K) -> GatewayError,
    steps: Mutex<VecDeque<Step<T>>>,
    calls: Mutex<Vec<K>>,
    call_count: watch::Sender<usize>,
}

impl<K: Clone, T> Script<K, T> {
    fn new(endpoint: Endpoint, unscripted: fn(&K) -> GatewayError) -> Self {
        let (call_count, _rx) = watch::channel(0);
        Self {
            endpoint,
            unscripted,
            steps: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            call_count,
        }
    }

    /// Queue a successful response.
    pub fn push_ok(&self, value: T) {
        locked(&self.steps).push_back(Step::Ready(Ok(value)));
    }

    /// Queue a failed response.
    pub fn push_err(&self, error: GatewayError) {
        locked(&self.steps).push_back(Step::Ready(Err(error)));
    }

    /// Queue a response that stays pending until the returned [`Release`] resolves it.
    #[must_use]
    pub fn hold(&self) -> Release<T> {
        let (tx, rx) = oneshot::channel();
        locked(&self.steps).push_back(Step::Held(rx));
        Release {
            endpoint: self.endpoint,
            tx,
        }
    }

    /// Arguments of every call received so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<K> {
        locked(&self.calls).clone()
    }

    /// Number of calls received so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        *self.call_count.borrow()
    }

    /// Wait until at least `count` calls have been received.
    pub async fn wait_for_calls(&self, count: usize) {
        let mut rx = self.call_count.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait.
        let _ = rx.wait_for(|seen| *seen >= count).await;
    }

    async fn next(&self, key: K) -> GatewayResult<T> {
        let fallback = (self.unscripted)(&key);
        locked(&self.calls).push(key);
        let step = locked(&self.steps).pop_front();
        self.call_count.send_modify(|count| *count += 1);

        match step {
            Some(Step::Ready(result)) => result,
            Some(Step::Held(rx)) => rx.await.unwrap_or_else(|_| {
                Err(GatewayError::request(
                    self.endpoint,
                    None,
                    "held response was dropped",
                ))
            }),
            None => Err(fallback),
        }
    }
}

/// Handle resolving a held response.
pub struct Release<T> {
    endpoint: Endpoint,
    tx: oneshot::Sender<GatewayResult<T>>,
}

impl<T> Release<T> {
    /// Complete the held call with `result`. Ignored if the caller went away.
    pub fn resolve(self, result: GatewayResult<T>) {
        let _ = self.tx.send(result);
    }

    /// Complete the held call successfully.
    pub fn succeed(self, value: T) {
        self.resolve(Ok(value));
    }

    /// Complete the held call with a transient not-found failure.
    pub fn fail_not_found(self) {
        let endpoint = self.endpoint;
        self.resolve(Err(not_found_status(endpoint)));
    }
}

fn not_found_status(endpoint: Endpoint) -> GatewayError {
    GatewayError::request(endpoint, Some(404), "request failed with status 404 Not Found")
}

/// [`AnimeGateway`] answering from per-endpoint scripts.
///
/// Unscripted searches miss with [`GatewayError::NotFound`]; unscripted episode and manga
/// calls fail with a 404 [`GatewayError::Request`].
pub struct ScriptedGateway {
    /// Search script keyed by the trimmed query.
    pub search: Script<String, AnimeRecord>,
    /// Episode-analysis script keyed by anime id.
    pub episodes: Script<AnimeId, EpisodeAnalysisRecord>,
    /// Manga-info script keyed by anime id.
    pub manga: Script<AnimeId, MangaInfoRecord>,
}

impl Default for ScriptedGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedGateway {
    /// Gateway with empty scripts.
    #[must_use]
    pub fn new() -> Self {
        Self {
            search: Script::new(Endpoint::Search, |query: &String| GatewayError::NotFound {
                query: query.clone(),
            }),
            episodes: Script::new(Endpoint::EpisodeAnalysis, |_: &AnimeId| {
                not_found_status(Endpoint::EpisodeAnalysis)
            }),
            manga: Script::new(Endpoint::MangaInfo, |_: &AnimeId| {
                not_found_status(Endpoint::MangaInfo)
            }),
        }
    }

    /// Queue `count` transient not-found failures on the manga endpoint.
    pub fn fail_manga(&self, count: usize) {
        for _ in 0..count {
            self.manga.push_err(not_found_status(Endpoint::MangaInfo));
        }
    }
}

#[async_trait]
impl AnimeGateway for ScriptedGateway {
    async fn search_by_name(&self, name: &str) -> GatewayResult<AnimeRecord> {
        self.search.next(name.trim().to_string()).await
    }

    async fn fetch_episode_analysis(&self, id: AnimeId) -> GatewayResult<EpisodeAnalysisRecord> {
        self.episodes.next(id).await
    }

    async fn fetch_manga_info(&self, id: AnimeId) -> GatewayResult<MangaInfoRecord> {
        self.manga.next(id).await
    }
}
