//! Release schedule and distribution index feeds.
//!
//! The schedule maps each major line (`v18`) to its support dates; the
//! distribution index lists every published release and flags the ones
//! that shipped security fixes. Both are fetched at most once per
//! [`FeedClient`].

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::cache::FeedCache;
use super::fetch::{FetchError, HttpFetcher, RetryPolicy};
use crate::version;

pub const DEFAULT_SCHEDULE_URL: &str =
    "https://raw.githubusercontent.com/nodejs/Release/main/schedule.json";
pub const DEFAULT_DIST_INDEX_URL: &str = "https://nodejs.org/dist/index.json";

/// Support dates for one major line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub start: NaiveDate,
    #[serde(default)]
    pub lts: Option<NaiveDate>,
    #[serde(default)]
    pub maintenance: Option<NaiveDate>,
    pub end: NaiveDate,
    #[serde(default)]
    pub codename: Option<String>,
}

/// Release schedule keyed by major line (`v18`, `v0.12`).
pub type ReleaseSchedule = BTreeMap<String, ScheduleEntry>;

/// One published release.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistRelease {
    pub version: String,
    #[serde(default)]
    pub date: Option<String>,
    /// `false` or the LTS codename.
    #[serde(default)]
    pub lts: serde_json::Value,
    #[serde(default)]
    pub security: bool,
    #[serde(default)]
    pub npm: Option<String>,
}

impl DistRelease {
    /// LTS codename, if this is an LTS release.
    pub fn lts_name(&self) -> Option<&str> {
        self.lts.as_str()
    }
}

/// Support status of a major line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EolStatus {
    Active,
    Maintenance,
    Eol,
    Unknown,
}

impl std::fmt::Display for EolStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EolStatus::Active => write!(f, "active"),
            EolStatus::Maintenance => write!(f, "maintenance"),
            EolStatus::Eol => write!(f, "end-of-life"),
            EolStatus::Unknown => write!(f, "unknown"),
        }
    }
}

/// EOL lookup result for one version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EolInfo {
    pub status: EolStatus,
    pub major: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintenance: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codename: Option<String>,
}

impl EolInfo {
    fn unknown(major: Option<u64>) -> Self {
        Self {
            status: EolStatus::Unknown,
            major,
            end: None,
            maintenance: None,
            codename: None,
        }
    }
}

/// Classify `version` against the schedule as of `today`.
///
/// Past `end` is EOL; on or past `maintenance` is maintenance; a missing
/// schedule or entry is unknown.
pub fn check_eol(schedule: Option<&ReleaseSchedule>, version: &str, today: NaiveDate) -> EolInfo {
    let major = version::major(version);
    let Some(schedule) = schedule else {
        return EolInfo::unknown(major);
    };
    let Some(m) = major else {
        return EolInfo::unknown(None);
    };
    // 0.x lines are keyed by major.minor
    let key = if m == 0 {
        let [_, minor, _] = version::components(version);
        format!("v0.{}", minor)
    } else {
        format!("v{}", m)
    };
    let Some(entry) = schedule.get(&key) else {
        return EolInfo::unknown(major);
    };

    let status = if today > entry.end {
        EolStatus::Eol
    } else if entry.maintenance.is_some_and(|d| today >= d) {
        EolStatus::Maintenance
    } else {
        EolStatus::Active
    };

    EolInfo {
        status,
        major,
        end: Some(entry.end),
        maintenance: entry.maintenance,
        codename: entry.codename.clone(),
    }
}

/// Security lookup result for one version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityInfo {
    /// A later release in the same major shipped security fixes.
    pub vulnerable: bool,
    /// Nearest later security release in the same major.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Newest release in the same major.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_in_major: Option<String>,
    /// Whether the index was available.
    pub checked: bool,
}

/// Compare `version` against the distribution index.
pub fn check_security(index: Option<&[DistRelease]>, version: &str) -> SecurityInfo {
    let Some(index) = index else {
        return SecurityInfo {
            vulnerable: false,
            target: None,
            latest_in_major: None,
            checked: false,
        };
    };
    let major = version::major(version);
    let current = version::normalize(version);

    let mut same_major: Vec<&DistRelease> = index
        .iter()
        .filter(|r| major.is_some() && version::major(&r.version) == major)
        .collect();
    same_major.sort_by(|a, b| version::compare(&a.version, &b.version));

    let target = same_major
        .iter()
        .filter(|r| r.security)
        .find(|r| version::compare(&r.version, &current).is_gt())
        .map(|r| version::normalize(&r.version));
    let latest_in_major = same_major.last().map(|r| version::normalize(&r.version));

    SecurityInfo {
        vulnerable: target.is_some(),
        target,
        latest_in_major,
        checked: true,
    }
}

/// Memoizing client for both feeds.
pub struct FeedClient {
    fetcher: HttpFetcher,
    retry: RetryPolicy,
    schedule_url: String,
    dist_index_url: String,
    schedule: FeedCache<Arc<ReleaseSchedule>>,
    dist_index: FeedCache<Arc<Vec<DistRelease>>>,
}

impl FeedClient {
    pub fn new(fetcher: HttpFetcher, retry: RetryPolicy) -> Self {
        Self {
            fetcher,
            retry,
            schedule_url: DEFAULT_SCHEDULE_URL.to_string(),
            dist_index_url: DEFAULT_DIST_INDEX_URL.to_string(),
            schedule: FeedCache::new(),
            dist_index: FeedCache::new(),
        }
    }

    /// Override the feed URLs.
    pub fn with_urls(mut self, schedule_url: impl Into<String>, dist_index_url: impl Into<String>) -> Self {
        self.schedule_url = schedule_url.into();
        self.dist_index_url = dist_index_url.into();
        self
    }

    /// Fetch (or return the memoized) release schedule.
    pub fn schedule(&self) -> Result<Arc<ReleaseSchedule>, FetchError> {
        self.schedule.get_or_try_load(|| {
            tracing::debug!("Fetching release schedule from {}", self.schedule_url);
            self.retry
                .run(|| self.fetcher.get_json::<ReleaseSchedule>(&self.schedule_url))
                .map(Arc::new)
        })
    }

    /// Fetch (or return the memoized) distribution index.
    pub fn dist_index(&self) -> Result<Arc<Vec<DistRelease>>, FetchError> {
        self.dist_index.get_or_try_load(|| {
            tracing::debug!("Fetching distribution index from {}", self.dist_index_url);
            self.retry
                .run(|| self.fetcher.get_json::<Vec<DistRelease>>(&self.dist_index_url))
                .map(Arc::new)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use std::time::Duration;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn schedule() -> ReleaseSchedule {
        serde_json::from_str(
            r#"{
                "v16": {"start": "2021-04-20", "lts": "2021-10-26", "maintenance": "2022-10-18", "end": "2023-09-11", "codename": "Gallium"},
                "v20": {"start": "2023-04-18", "lts": "2023-10-24", "maintenance": "2024-10-22", "end": "2026-04-30", "codename": "Iron"},
                "v23": {"start": "2024-10-16", "end": "2099-06-01"}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn past_end_is_eol() {
        let info = check_eol(Some(&schedule()), "16.20.2", date("2024-01-01"));
        assert_eq!(info.status, EolStatus::Eol);
        assert_eq!(info.codename.as_deref(), Some("Gallium"));
    }

    #[test]
    fn future_end_without_maintenance_is_active() {
        let info = check_eol(Some(&schedule()), "v23.1.0", date("2025-01-01"));
        assert_eq!(info.status, EolStatus::Active);
        assert_eq!(info.major, Some(23));
    }

    #[test]
    fn maintenance_passed_end_future_is_maintenance() {
        let info = check_eol(Some(&schedule()), "20.11.0", date("2025-06-01"));
        assert_eq!(info.status, EolStatus::Maintenance);
    }

    #[test]
    fn missing_entry_or_schedule_is_unknown() {
        assert_eq!(
            check_eol(Some(&schedule()), "21.0.0", date("2025-01-01")).status,
            EolStatus::Unknown
        );
        assert_eq!(check_eol(None, "20.0.0", date("2025-01-01")).status, EolStatus::Unknown);
    }

    fn release(version: &str, security: bool) -> DistRelease {
        DistRelease {
            version: version.to_string(),
            date: None,
            lts: serde_json::Value::Bool(false),
            security,
            npm: None,
        }
    }

    #[test]
    fn nearest_later_security_release_is_target() {
        let index = vec![
            release("v18.2.0", true),
            release("v18.1.0", true),
            release("v18.0.0", false),
            release("v20.0.0", true),
        ];
        let info = check_security(Some(index.as_slice()), "18.0.0");
        assert!(info.vulnerable);
        assert_eq!(info.target.as_deref(), Some("18.1.0"));
        assert_eq!(info.latest_in_major.as_deref(), Some("18.2.0"));
    }

    #[test]
    fn up_to_date_version_is_not_vulnerable() {
        let index = vec![release("v18.1.0", true), release("v18.2.0", false)];
        let info = check_security(Some(index.as_slice()), "v18.2.0");
        assert!(!info.vulnerable);
        assert!(info.checked);
        assert!(!check_security(None, "18.0.0").checked);
    }

    #[test]
    fn dist_release_lts_field() {
        let r: DistRelease = serde_json::from_str(
            r#"{"version":"v20.11.0","date":"2024-01-09","lts":"Iron","security":false,"npm":"10.2.4"}"#,
        )
        .unwrap();
        assert_eq!(r.lts_name(), Some("Iron"));
        assert_eq!(release("v21.0.0", false).lts_name(), None);
    }

    #[test]
    fn client_memoizes_feeds() {
        let server = MockServer::start();
        let schedule_mock = server.mock(|when, then| {
            when.method(GET).path("/schedule.json");
            then.status(200)
                .body(r#"{"v20": {"start": "2023-04-18", "end": "2026-04-30"}}"#);
        });
        let index_mock = server.mock(|when, then| {
            when.method(GET).path("/index.json");
            then.status(200).body(r#"[{"version":"v20.0.0","lts":false,"security":true}]"#);
        });

        let retry = RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::ZERO,
        };
        let client = FeedClient::new(HttpFetcher::with_timeout(Duration::from_secs(5)), retry)
            .with_urls(server.url("/schedule.json"), server.url("/index.json"));

        assert!(client.schedule().unwrap().contains_key("v20"));
        assert!(client.schedule().unwrap().contains_key("v20"));
        assert_eq!(client.dist_index().unwrap().len(), 1);
        assert_eq!(client.dist_index().unwrap().len(), 1);

        schedule_mock.assert_calls(1);
        index_mock.assert_calls(1);
    }
}
