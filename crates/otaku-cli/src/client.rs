//! Shared context, error types, and logging wiring for the CLI.

use std::fmt::{self, Display, Formatter};
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use otaku_detail::{DetailConfig, SearchError};
use otaku_gateway::{AnimeGateway, GatewayConfig, HttpGateway};
use otaku_telemetry::{LogFormat, LoggingConfig, init_logging};
use tracing::debug;

use crate::cli::Cli;

/// Why a command stopped: bad input (exit 2) or a failing dependency (exit 3).
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

/// Result type of every command handler.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        self.to_string()
    }
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(message) => f.write_str(message),
            Self::Failure(error) => write!(f, "{error:#}"),
        }
    }
}

impl std::error::Error for CliError {}

impl From<SearchError> for CliError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::EmptyQuery | SearchError::NotFound { .. } => {
                Self::validation(err.user_message())
            }
            SearchError::Failed { .. } => {
                let message = err.user_message();
                Self::failure(anyhow::Error::new(err).context(message))
            }
        }
    }
}

/// Dependencies shared by every command handler.
#[derive(Clone)]
pub(crate) struct AppContext {
    pub(crate) gateway: Arc<dyn AnimeGateway>,
    pub(crate) detail: DetailConfig,
}

impl AppContext {
    /// Resolve settings from the environment, then apply any explicit flags on top.
    pub(crate) fn from_cli(cli: &Cli) -> CliResult<Self> {
        let gateway =
            GatewayConfig::from_env().map_err(|err| CliError::validation(err.to_string()))?;
        let detail =
            DetailConfig::from_env().map_err(|err| CliError::validation(err.to_string()))?;
        Self::with_overrides(cli, gateway, detail)
    }

    fn with_overrides(
        cli: &Cli,
        mut gateway: GatewayConfig,
        mut detail: DetailConfig,
    ) -> CliResult<Self> {
        if let Some(url) = &cli.api_url {
            gateway.base_url = url.clone();
        }
        if let Some(secs) = cli.timeout {
            if secs == 0 {
                return Err(CliError::validation("timeout must be at least one second"));
            }
            gateway.timeout = Duration::from_secs(secs);
        }
        if let Some(max_retries) = cli.manga_max_retries {
            detail.retry.max_retries = max_retries;
        }
        if let Some(base_delay) = cli.manga_base_delay_ms {
            detail.retry.base_delay = base_delay;
        }
        debug!(
            api_url = %gateway.base_url,
            timeout_secs = gateway.timeout.as_secs(),
            max_attempts = detail.retry.max_attempts(),
            "resolved settings"
        );

        let client = HttpGateway::new(&gateway)
            .map_err(|err| CliError::failure(anyhow!("failed to build HTTP client: {err}")))?;
        Ok(Self {
            gateway: Arc::new(client),
            detail,
        })
    }
}

/// Install the tracing subscriber; a failure only costs us log output.
pub(crate) fn init_tracing(cli: &Cli) {
    let config = LoggingConfig {
        level: &cli.log_level,
        format: cli.log_format.unwrap_or_else(LogFormat::infer),
        version: env!("CARGO_PKG_VERSION"),
    };
    if let Err(err) = init_logging(&config) {
        eprintln!("warning: {err}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use otaku_gateway::{Endpoint, GatewayError};

    #[test]
    fn exit_codes_split_validation_from_failure() {
        assert_eq!(CliError::validation("bad").exit_code(), 2);
        assert_eq!(CliError::failure(anyhow!("boom")).exit_code(), 3);
        assert_eq!(CliError::validation("bad").display_message(), "bad");
    }

    #[test]
    fn search_errors_map_to_cli_errors() {
        let miss = CliError::from(SearchError::NotFound {
            query: "Nothing".into(),
        });
        assert_eq!(miss.exit_code(), 2);
        assert_eq!(
            miss.display_message(),
            "No results found. Try a different title."
        );

        let failed = CliError::from(SearchError::Failed {
            source: GatewayError::request(Endpoint::Search, Some(500), "boom"),
        });
        assert_eq!(failed.exit_code(), 3);
        assert!(
            failed
                .display_message()
                .starts_with("No results found. Try a different title.")
        );
    }

    fn env_layer(pairs: &'static [(&'static str, &'static str)]) -> (GatewayConfig, DetailConfig) {
        let lookup = |key: &str| {
            pairs
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (*value).to_string())
        };
        (
            GatewayConfig::from_lookup(lookup).expect("gateway env"),
            DetailConfig::from_lookup(lookup).expect("detail env"),
        )
    }

    #[test]
    fn environment_settings_apply_without_flags() {
        let cli = Cli::try_parse_from(["otaku", "search", "Naruto"]).expect("parse");
        let (gateway, detail) = env_layer(&[
            ("OTAKU_MANGA_MAX_RETRIES", "4"),
            ("OTAKU_MANGA_BASE_DELAY_MS", "250"),
        ]);
        let ctx = AppContext::with_overrides(&cli, gateway, detail).expect("context");
        assert_eq!(ctx.detail.retry.max_attempts(), 5);
        assert_eq!(ctx.detail.retry.base_delay, Duration::from_millis(250));
    }

    #[test]
    fn flags_override_environment_settings() {
        let cli = Cli::try_parse_from([
            "otaku",
            "--manga-max-retries",
            "1",
            "--manga-base-delay-ms",
            "50",
            "search",
            "Naruto",
        ])
        .expect("parse");
        let (gateway, detail) = env_layer(&[
            ("OTAKU_MANGA_MAX_RETRIES", "4"),
            ("OTAKU_MANGA_BASE_DELAY_MS", "250"),
        ]);
        let ctx = AppContext::with_overrides(&cli, gateway, detail).expect("context");
        assert_eq!(ctx.detail.retry.max_attempts(), 2);
        assert_eq!(ctx.detail.retry.base_delay, Duration::from_millis(50));
    }

    #[test]
    fn zero_timeout_is_a_validation_error() {
        let cli = Cli::try_parse_from(["otaku", "--timeout", "0", "search", "Naruto"])
            .expect("parse");
        let (gateway, detail) = env_layer(&[]);
        let err = AppContext::with_overrides(&cli, gateway, detail)
            .err()
            .expect("zero timeout rejected");
        assert_eq!(err.exit_code(), 2);
    }
}
