//! Local cache for API responses
//!
//! SQLite-backed with file blobs for large payloads. Only reads are cached;
//! it is opt-in per command (`pr-metrics --use-cache`).

pub mod client;
pub mod key;
pub mod storage;

use std::time::Duration;

/// Cache lifetime per kind of response
pub struct CacheTtl;

impl CacheTtl {
    // Identity and repository metadata rarely change
    pub const USER: Duration = Duration::from_secs(60 * 60); // 1 hr
    pub const REPOS: Duration = Duration::from_secs(60 * 60); // 1 hr

    // Activity data
    pub const PULLS: Duration = Duration::from_secs(10 * 60); // 10 min
    pub const REVIEWS: Duration = Duration::from_secs(10 * 60); // 10 min
    pub const ALERTS: Duration = Duration::from_secs(10 * 60); // 10 min
    pub const COMPARE: Duration = Duration::from_secs(10 * 60); // 10 min

    pub const RELEASES: Duration = Duration::from_secs(30 * 60); // 30 min
}

pub use client::CachedGitHubClient;
pub use key::cache_key;
pub use storage::CacheStorage;
