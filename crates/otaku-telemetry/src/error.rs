//! Failures raised while setting up logging.

use thiserror::Error;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::util::TryInitError;

/// Result alias for telemetry operations.
pub type Result<T> = std::result::Result<T, TelemetryError>;

/// Errors raised by [`init_logging`](crate::init_logging) and flag parsing.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// A global subscriber was already installed.
    #[error("failed to install tracing subscriber")]
    SubscriberInstall {
        /// Error reported by `tracing-subscriber`.
        #[source]
        source: TryInitError,
    },
    /// The level passed on the command line is not a valid filter directive.
    #[error("invalid log level '{directive}'")]
    InvalidFilter {
        /// Level or directive list as supplied.
        directive: String,
        /// Parser failure from the env filter.
        #[source]
        source: ParseError,
    },
    /// A log format label was not recognised.
    #[error("unknown log format '{value}' (expected json or pretty)")]
    UnknownFormat {
        /// Label supplied by the caller.
        value: String,
    },
}
