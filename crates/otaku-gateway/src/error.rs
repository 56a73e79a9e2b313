//! Error types for gateway operations.

use std::fmt::{self, Display, Formatter};

use thiserror::Error;

/// Result alias for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Remote operation a failure originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Name search.
    Search,
    /// Episode analysis lookup.
    EpisodeAnalysis,
    /// Manga info lookup.
    MangaInfo,
}

impl Endpoint {
    /// Stable label used in logs and error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::EpisodeAnalysis => "episode_analysis",
            Self::MangaInfo => "manga_info",
        }
    }
}

impl Display for Endpoint {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Failures surfaced by the remote data gateway.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The search yielded no match.
    #[error("no anime matched '{query}'")]
    NotFound {
        /// Search text that produced no match.
        query: String,
    },
    /// Transport failure or non-success response.
    #[error("{endpoint} request failed: {message}")]
    Request {
        /// Operation that failed.
        endpoint: Endpoint,
        /// HTTP status when a response was received.
        status: Option<u16>,
        /// Human-readable failure detail.
        message: String,
    },
    /// The response body did not match the expected record.
    #[error("{endpoint} response could not be decoded: {message}")]
    Decode {
        /// Operation whose response was malformed.
        endpoint: Endpoint,
        /// Decoder failure detail.
        message: String,
    },
    /// The request was rejected before being issued.
    #[error("invalid gateway input: {0}")]
    InvalidInput(String),
}

impl GatewayError {
    /// Build a [`GatewayError::Request`] from its parts.
    #[must_use]
    pub fn request(endpoint: Endpoint, status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Request {
            endpoint,
            status,
            message: message.into(),
        }
    }

    /// Whether the failure is a definitive search miss.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// HTTP status attached to the failure, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Request { status, .. } => *status,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_error_display_includes_context() {
        let cases = vec![
            (
                GatewayError::NotFound {
                    query: "Unknown Title".into(),
                },
                "no anime matched 'Unknown Title'",
            ),
            (
                GatewayError::request(Endpoint::MangaInfo, Some(404), "status 404"),
                "manga_info request failed: status 404",
            ),
            (
                GatewayError::Decode {
                    endpoint: Endpoint::EpisodeAnalysis,
                    message: "missing field".into(),
                },
                "episode_analysis response could not be decoded: missing field",
            ),
            (
                GatewayError::InvalidInput("blank".into()),
                "invalid gateway input: blank",
            ),
        ];

        for (err, message) in cases {
            assert_eq!(err.to_string(), message);
        }
    }

    #[test]
    fn only_search_misses_count_as_not_found() {
        assert!(GatewayError::NotFound { query: "x".into() }.is_not_found());
        let transient = GatewayError::request(Endpoint::MangaInfo, Some(404), "not found");
        assert!(!transient.is_not_found());
        assert_eq!(transient.status(), Some(404));
    }
}
