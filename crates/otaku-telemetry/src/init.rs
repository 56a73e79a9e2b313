//! Subscriber installation for Otaku Insight binaries.
//!
//! `RUST_LOG` wins when present. Otherwise the requested level applies to the workspace's own
//! crates while dependencies (reqwest, hyper) stay at `warn`.

use std::str::FromStr;

use once_cell::sync::OnceCell;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::{Result, TelemetryError};

/// Level applied to workspace crates when neither `RUST_LOG` nor a flag says otherwise.
pub const DEFAULT_LOG_LEVEL: &str = "info";

const WORKSPACE_TARGETS: [&str; 5] = [
    "otaku_cli",
    "otaku_detail",
    "otaku_gateway",
    "otaku_models",
    "otaku_telemetry",
];

static INSTALLED: OnceCell<Installed> = OnceCell::new();

#[derive(Debug)]
struct Installed {
    format: LogFormat,
    version: String,
}

/// Inputs for [`init_logging`].
#[derive(Debug, Clone)]
pub struct LoggingConfig<'a> {
    /// Level or directive list for workspace crates, e.g. `debug` or `otaku_detail=trace`.
    pub level: &'a str,
    /// Output encoding.
    pub format: LogFormat,
    /// Version string stamped on the startup event.
    pub version: &'a str,
}

impl Default for LoggingConfig<'_> {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL,
            format: LogFormat::infer(),
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

/// Log encodings understood by the `--log-format` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per event.
    Json,
    /// Human-readable lines.
    Pretty,
}

impl LogFormat {
    /// Pretty for debug builds, JSON for release builds.
    #[must_use]
    pub const fn infer() -> Self {
        if cfg!(debug_assertions) {
            Self::Pretty
        } else {
            Self::Json
        }
    }

    /// Flag spelling of the format.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Pretty => "pretty",
        }
    }
}

impl FromStr for LogFormat {
    type Err = TelemetryError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" | "text" => Ok(Self::Pretty),
            _ => Err(TelemetryError::UnknownFormat {
                value: value.to_string(),
            }),
        }
    }
}

/// Install the global subscriber, writing to stderr so command output on stdout stays clean.
///
/// # Errors
///
/// [`TelemetryError::InvalidFilter`] when `config.level` is not a valid directive, and
/// [`TelemetryError::SubscriberInstall`] when a global subscriber is already set.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = build_filter(config.level)?;
    let result = match config.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .try_init(),
    };
    result.map_err(|source| TelemetryError::SubscriberInstall { source })?;

    let _ = INSTALLED.set(Installed {
        format: config.format,
        version: config.version.to_string(),
    });
    tracing::debug!(
        version = config.version,
        format = config.format.as_str(),
        "logging initialised"
    );
    Ok(())
}

/// Format chosen by the subscriber that is actually installed, if any.
#[must_use]
pub fn installed_format() -> Option<LogFormat> {
    INSTALLED.get().map(|installed| installed.format)
}

/// Version recorded at install time, `dev` before logging is set up.
#[must_use]
pub fn build_version() -> &'static str {
    INSTALLED.get().map_or("dev", |installed| installed.version.as_str())
}

fn build_filter(level: &str) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(scoped_directives(level)).map_err(|source| TelemetryError::InvalidFilter {
        directive: level.to_string(),
        source,
    })
}

/// A bare level is scoped to workspace crates; anything with `=` or `,` is passed through.
fn scoped_directives(level: &str) -> String {
    let level = level.trim();
    if level.contains('=') || level.contains(',') {
        return level.to_string();
    }
    let mut directives = String::from("warn");
    for target in WORKSPACE_TARGETS {
        directives.push(',');
        directives.push_str(target);
        directives.push('=');
        directives.push_str(level);
    }
    directives
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_format_parses_flag_values() {
        assert_eq!("json".parse::<LogFormat>().ok(), Some(LogFormat::Json));
        assert_eq!(" Text ".parse::<LogFormat>().ok(), Some(LogFormat::Pretty));
        assert!("xml".parse::<LogFormat>().is_err());
        assert_eq!(LogFormat::Json.as_str(), "json");
    }

    #[test]
    fn bare_level_is_scoped_to_workspace_crates() {
        let directives = scoped_directives("debug");
        assert!(directives.starts_with("warn,"));
        assert!(directives.contains("otaku_detail=debug"));
        assert!(directives.contains("otaku_gateway=debug"));
        assert!(!directives.contains("reqwest"));
    }

    #[test]
    fn explicit_directives_pass_through() {
        assert_eq!(
            scoped_directives("otaku_detail=trace"),
            "otaku_detail=trace"
        );
        assert_eq!(scoped_directives("info,hyper=off"), "info,hyper=off");
    }

    #[test]
    fn second_install_fails_and_keeps_first_format() {
        let config = LoggingConfig {
            level: "info",
            format: LogFormat::Pretty,
            version: "test",
        };
        let first = init_logging(&config);
        let second = init_logging(&LoggingConfig {
            format: LogFormat::Json,
            ..config
        });
        assert!(second.is_err());
        if first.is_ok() {
            assert_eq!(installed_format(), Some(LogFormat::Pretty));
            assert_eq!(build_version(), "test");
        }
    }
}
