//! Search boundary: turns a title into the navigation payload for the detail view.

use otaku_gateway::{AnimeGateway, GatewayError};
use thiserror::Error;

use crate::identity::NavigationPayload;

/// Message shown to the user whenever a search does not produce a record.
pub const NO_RESULTS_MESSAGE: &str = "No results found. Try a different title.";

/// Search failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    /// The query was blank; no request was issued.
    #[error("enter an anime title to search")]
    EmptyQuery,
    /// The gateway found no match.
    #[error("no anime matched '{query}'")]
    NotFound {
        /// Query as typed by the user.
        query: String,
    },
    /// Any other gateway failure.
    #[error("search failed: {source}")]
    Failed {
        /// Underlying gateway error.
        #[source]
        source: GatewayError,
    },
}

impl SearchError {
    /// Text to show the user for this failure.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::EmptyQuery => "Enter an anime title to search.",
            Self::NotFound { .. } | Self::Failed { .. } => NO_RESULTS_MESSAGE,
        }
    }
}

/// Search for `name` and build the payload used to open its detail page.
///
/// # Errors
///
/// Returns [`SearchError::EmptyQuery`] for blank input without calling the gateway,
/// [`SearchError::NotFound`] for a definitive miss and [`SearchError::Failed`] otherwise.
pub async fn search(
    gateway: &dyn AnimeGateway,
    name: &str,
) -> Result<NavigationPayload, SearchError> {
    let query = name.trim();
    if query.is_empty() {
        return Err(SearchError::EmptyQuery);
    }
    match gateway.search_by_name(query).await {
        Ok(anime) => {
            tracing::debug!(anime_id = %anime.mal_id, query, "search resolved");
            Ok(NavigationPayload::new(anime))
        }
        Err(err) if err.is_not_found() => {
            tracing::info!(query, "search returned no match");
            Err(SearchError::NotFound {
                query: query.to_string(),
            })
        }
        Err(err) => {
            tracing::warn!(query, error = %err, "search failed");
            Err(SearchError::Failed { source: err })
        }
    }
}
