#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    clippy::all,
    clippy::pedantic,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls
)]
#![warn(missing_docs, unreachable_pub)]
//! Telemetry primitives shared across the Otaku Insight workspace.
//!
//! This crate centralises logging setup so the CLI and any future shell adopt a
//! consistent structured-logging story.

pub mod error;
pub mod init;

pub use error::{Result, TelemetryError};
pub use init::{
    DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, build_version, init_logging, installed_format,
};
