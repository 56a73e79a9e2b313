#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    clippy::all,
    clippy::pedantic,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls
)]
#![warn(missing_docs, unreachable_pub)]

//! Shared test helpers used across integration suites.
//! Layout: fixtures.rs (canned API records), mocks.rs (scripted gateway with held responses).

pub mod fixtures;
pub mod mocks;

pub use mocks::{Release, Script, ScriptedGateway};
