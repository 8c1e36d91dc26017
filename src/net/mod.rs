//! Network collaborators.
//!
//! - [`fetch`] - Blocking HTTP client, [`FetchError`] and [`RetryPolicy`]
//! - [`cache`] - [`FeedCache`] memoization with an injected [`Clock`]
//! - [`feeds`] - Release schedule and distribution index lookups

pub mod cache;
pub mod feeds;
pub mod fetch;

pub use cache::{Clock, FeedCache, SystemClock};
pub use feeds::{
    check_eol, check_security, DistRelease, EolInfo, EolStatus, FeedClient, ReleaseSchedule,
    ScheduleEntry, SecurityInfo, DEFAULT_DIST_INDEX_URL, DEFAULT_SCHEDULE_URL,
};
pub use fetch::{FetchError, HeadResponse, HttpFetcher, RetryPolicy};

/// Default npm registry endpoint.
pub const DEFAULT_REGISTRY_URL: &str = "https://registry.npmjs.org/";
