#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    clippy::all,
    clippy::pedantic,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls
)]
#![warn(missing_docs, unreachable_pub)]
//! Fetch orchestration for the anime detail view.
//!
//! Layout:
//! - `token.rs`: per-activation cancellation token
//! - `slot.rs`: fetch state machine and read-only snapshots
//! - `scheduler.rs` / `retry.rs`: injectable delays and the bounded linear backoff
//! - `guard.rs`: staleness guard publishing slot state over a watch channel
//! - `driver.rs`: lazy-once episode driver and eager retried manga driver
//! - `identity.rs` / `search.rs`: entry boundary (routes, payloads, search)
//! - `view.rs`: the detail view composing everything above

pub mod config;
pub mod driver;
pub mod guard;
pub mod identity;
pub mod retry;
pub mod scheduler;
pub mod search;
pub mod slot;
pub mod token;
pub mod view;

pub use config::{ConfigError, DetailConfig};
pub use driver::{EPISODE_ERROR_MESSAGE, EpisodeSlotDriver, MANGA_ERROR_MESSAGE, MangaSlotDriver};
pub use guard::{Applied, GuardedSlot, SlotWatcher};
pub use identity::{DetailRoute, NavigationPayload, PrimaryEntity, RouteError, resolve_primary};
pub use retry::{RetryController, RetryOutcome, RetryPolicy};
pub use scheduler::{RetryScheduler, TokioScheduler};
pub use search::{NO_RESULTS_MESSAGE, SearchError, search};
pub use slot::{FetchSlot, FetchStatus, SlotKind, SlotSnapshot, TransitionError};
pub use token::ActivationToken;
pub use view::{DetailTab, DetailView, ParseTabError};
