//! storefront-poller: polls storefront instances and drives the console.
//!
//! - `fetcher`: the `StatFetcher` seam, its HTTP implementation and the
//!   sentinel fallback
//! - `session`: the single owner of the aggregate; applies completions
//!   posted by fetch tasks, one at a time
//! - `render`: text projection of the dashboard view
//! - `cli`: argument parsing and the `storefront-console` entry point

pub mod cli;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod logging;
pub mod mock;
pub mod render;
pub mod session;

/// Stable crate label used for bootstrap smoke tests.
pub fn crate_label() -> &'static str {
    "storefront-poller"
}
