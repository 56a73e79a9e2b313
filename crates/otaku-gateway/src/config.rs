//! Gateway configuration resolved from defaults and the environment.

use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Base URL used when `OTAKU_API_URL` is not set.
pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";
/// Per-request timeout used when `OTAKU_HTTP_TIMEOUT_SECS` is not set.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

const ENV_API_URL: &str = "OTAKU_API_URL";
const ENV_TIMEOUT_SECS: &str = "OTAKU_HTTP_TIMEOUT_SECS";

/// Configuration errors raised while reading gateway settings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A setting held a value that could not be parsed.
    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        /// Environment key or option name.
        key: &'static str,
        /// Offending value.
        value: String,
        /// Machine-readable reason.
        reason: &'static str,
    },
}

/// Connection settings for [`crate::HttpGateway`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// API root; endpoint paths are appended to it.
    pub base_url: Url,
    /// Timeout applied to each request.
    pub timeout: Duration,
    /// User agent sent with every request.
    pub user_agent: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_API_URL).unwrap_or_else(|_| unreachable!()),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: concat!("otaku-insight/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl GatewayConfig {
    /// Read settings from the process environment, falling back to defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when a variable is present but malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve settings through an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when a value is present but malformed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(raw) = lookup(ENV_API_URL) {
            config.base_url = parse_base_url(&raw)?;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            let secs = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidValue {
                    key: ENV_TIMEOUT_SECS,
                    value: raw.clone(),
                    reason: "expected a positive number of seconds",
                })?;
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }
}

/// Parse and validate an API root URL.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] for unparsable URLs or non-HTTP schemes.
pub fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason| ConfigError::InvalidValue {
        key: ENV_API_URL,
        value: raw.to_string(),
        reason,
    };
    let url = Url::parse(raw.trim()).map_err(|_| invalid("not a valid URL"))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https"));
    }
    Ok(url)
}
