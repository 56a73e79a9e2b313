//! reqwest-backed gateway implementation.

use async_trait::async_trait;
use otaku_models::{AnimeId, AnimeRecord, EpisodeAnalysisRecord, MangaInfoRecord};
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::AnimeGateway;
use crate::config::GatewayConfig;
use crate::error::{Endpoint, GatewayError, GatewayResult};

pub(crate) const HEADER_REQUEST_ID: &str = "x-request-id";

/// HTTP client for the Otaku Insight REST API.
#[derive(Clone, Debug)]
pub struct HttpGateway {
    client: Client,
    base_url: Url,
}

impl HttpGateway {
    /// Build a gateway with its own connection pool.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidInput`] if the HTTP client cannot be constructed
    /// or the base URL cannot carry path segments.
    pub fn new(config: &GatewayConfig) -> GatewayResult<Self> {
        if config.base_url.cannot_be_a_base() {
            return Err(GatewayError::InvalidInput(format!(
                "base URL '{}' cannot carry paths",
                config.base_url
            )));
        }
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|err| {
                GatewayError::InvalidInput(format!("failed to build HTTP client: {err}"))
            })?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    fn endpoint_url(&self, segments: &[&str]) -> GatewayResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                GatewayError::InvalidInput(format!("base URL '{}' cannot carry paths", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: Endpoint, url: Url) -> GatewayResult<T> {
        let request_id = Uuid::new_v4().to_string();
        tracing::debug!(%endpoint, %url, request_id = %request_id, "issuing gateway request");

        let response = self
            .client
            .get(url)
            .header(HEADER_REQUEST_ID, request_id)
            .send()
            .await
            .map_err(|err| GatewayError::request(endpoint, None, err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(classify_status(endpoint, status));
        }

        response
            .json::<T>()
            .await
            .map_err(|err| GatewayError::Decode {
                endpoint,
                message: err.to_string(),
            })
    }
}

fn classify_status(endpoint: Endpoint, status: StatusCode) -> GatewayError {
    GatewayError::request(
        endpoint,
        Some(status.as_u16()),
        format!("request failed with status {status}"),
    )
}

#[async_trait]
impl AnimeGateway for HttpGateway {
    async fn search_by_name(&self, name: &str) -> GatewayResult<AnimeRecord> {
        let query = name.trim();
        if query.is_empty() {
            return Err(GatewayError::InvalidInput(
                "anime name cannot be empty".to_string(),
            ));
        }
        let mut url = self.endpoint_url(&["anime", "search"])?;
        url.query_pairs_mut().append_pair("name", query);

        match self.get_json(Endpoint::Search, url).await {
            Err(GatewayError::Request {
                status: Some(404), ..
            }) => Err(GatewayError::NotFound {
                query: query.to_string(),
            }),
            other => other,
        }
    }

    async fn fetch_episode_analysis(&self, id: AnimeId) -> GatewayResult<EpisodeAnalysisRecord> {
        let id = id.to_string();
        let url = self.endpoint_url(&["anime", id.as_str(), "episodes", "analysis"])?;
        self.get_json(Endpoint::EpisodeAnalysis, url).await
    }

    async fn fetch_manga_info(&self, id: AnimeId) -> GatewayResult<MangaInfoRecord> {
        let id = id.to_string();
        let url = self.endpoint_url(&["anime", id.as_str(), "manga-info"])?;
        self.get_json(Endpoint::MangaInfo, url).await
    }
}
