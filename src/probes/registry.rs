//! npm registry reachability and configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::net::HttpFetcher;
use crate::platform::HostEnv;
use crate::sys::fs::read_optional;

/// Timeout for the registry HEAD probe.
pub const REGISTRY_TIMEOUT: Duration = Duration::from_secs(3);

/// Result of probing the registry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryStatus {
    /// URL that was probed.
    pub url: String,
    pub available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Where the registry URL came from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryInfo {
    /// Registry npm will use.
    pub url: String,
    /// `config`, `env`, `project-npmrc`, `user-npmrc` or `default`.
    pub source: String,
}

/// Probe the registry with a HEAD request. Never fails.
///
/// Any 2xx or 3xx answer counts as reachable.
pub fn probe_registry(fetcher: &HttpFetcher, url: &str) -> RegistryStatus {
    match fetcher.head(url) {
        Ok(response) => {
            let available = (200..400).contains(&response.status);
            RegistryStatus {
                url: url.to_string(),
                available,
                latency_ms: Some(response.latency.as_millis() as u64),
                status_code: Some(response.status),
                error: (!available).then(|| format!("HTTP {}", response.status)),
            }
        }
        Err(e) => {
            tracing::debug!("Registry probe failed: {}", e);
            RegistryStatus {
                url: url.to_string(),
                available: false,
                latency_ms: None,
                status_code: None,
                error: Some(e.to_string()),
            }
        }
    }
}

/// Resolve the configured registry the way npm does: environment, then
/// project `.npmrc`, then user `.npmrc`, then the public default.
pub fn configured_registry(env: &HostEnv, default_url: &str) -> RegistryInfo {
    if let Some(url) = env
        .var("npm_config_registry")
        .or_else(|| env.var("NPM_CONFIG_REGISTRY"))
    {
        return RegistryInfo {
            url: url.to_string(),
            source: "env".to_string(),
        };
    }

    let candidates = [
        (env.cwd.join(".npmrc"), "project-npmrc"),
        (env.home_join(".npmrc"), "user-npmrc"),
    ];
    for (path, source) in candidates {
        if let Some(url) = read_optional(&path).and_then(|c| npmrc_registry(&c)) {
            return RegistryInfo {
                url,
                source: source.to_string(),
            };
        }
    }

    RegistryInfo {
        url: default_url.to_string(),
        source: "default".to_string(),
    }
}

/// Extract the unscoped `registry=` entry from `.npmrc` content.
pub fn npmrc_registry(content: &str) -> Option<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('#') && !line.starts_with(';'))
        .filter_map(|line| line.split_once('='))
        .find(|(key, _)| key.trim() == "registry")
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
