//! Registry reachability and configuration.

use crate::health::{Check, CheckCategory, CheckStatus, HealthData, HealthRule};

/// Latency above which the registry is reported as slow.
pub const SLOW_REGISTRY_MS: u64 = 2000;

pub struct NpmRegistryRule;

impl HealthRule for NpmRegistryRule {
    fn id(&self) -> &'static str {
        "npm-registry"
    }

    fn name(&self) -> &'static str {
        "npm registry"
    }

    fn category(&self) -> CheckCategory {
        CheckCategory::Network
    }

    fn evaluate(&self, data: &HealthData) -> Option<Check> {
        let registry = &data.registry;
        if !registry.available {
            let reason = registry
                .error
                .clone()
                .or_else(|| registry.status_code.map(|c| format!("HTTP {}", c)))
                .unwrap_or_else(|| "no response".to_string());
            return Some(
                self.check(
                    CheckStatus::Fail,
                    format!("Registry {} is unreachable ({})", registry.url, reason),
                )
                .with_hint("Check your network, proxy settings and the configured registry URL"),
            );
        }

        let latency = registry.latency_ms.unwrap_or(0);
        if latency > SLOW_REGISTRY_MS {
            return Some(
                self.check(
                    CheckStatus::Warn,
                    format!("Registry {} is slow ({}ms)", registry.url, latency),
                )
                .with_hint("Installs will be slow; consider a closer mirror"),
            );
        }
        Some(self.check(
            CheckStatus::Pass,
            format!("Registry {} reachable ({}ms)", registry.url, latency),
        ))
    }
}

/// Configured registry served over plain HTTP.
pub struct RegistryConfigRule;

impl HealthRule for RegistryConfigRule {
    fn id(&self) -> &'static str {
        "registry-config"
    }

    fn name(&self) -> &'static str {
        "Registry configuration"
    }

    fn category(&self) -> CheckCategory {
        CheckCategory::Network
    }

    fn evaluate(&self, data: &HealthData) -> Option<Check> {
        let config = &data.registry_config;
        if config.url.is_empty() {
            return None;
        }
        if config.url.to_ascii_lowercase().starts_with("http://") {
            return Some(
                self.check(
                    CheckStatus::Warn,
                    format!("Registry {} (from {}) uses plain HTTP", config.url, config.source),
                )
                .with_hint("Use an https:// registry URL so packages cannot be tampered with in transit"),
            );
        }
        Some(self.check(
            CheckStatus::Pass,
            format!("Registry {} (from {})", config.url, config.source),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probes::{RegistryInfo, RegistryStatus};

    fn with_registry(available: bool, latency_ms: Option<u64>) -> HealthData {
        HealthData {
            registry: RegistryStatus {
                url: "https://registry.npmjs.org/".to_string(),
                available,
                latency_ms,
                status_code: available.then_some(200),
                error: (!available).then(|| "connection refused".to_string()),
            },
            ..Default::default()
        }
    }

    #[test]
    fn slow_registry_warns() {
        let check = NpmRegistryRule.evaluate(&with_registry(true, Some(2500))).unwrap();
        assert_eq!(check.status, CheckStatus::Warn);
        assert!(check.message.contains("2500ms"));
    }

    #[test]
    fn fast_registry_passes() {
        let check = NpmRegistryRule.evaluate(&with_registry(true, Some(500))).unwrap();
        assert_eq!(check.status, CheckStatus::Pass);
    }

    #[test]
    fn threshold_is_exclusive() {
        let check = NpmRegistryRule
            .evaluate(&with_registry(true, Some(SLOW_REGISTRY_MS)))
            .unwrap();
        assert_eq!(check.status, CheckStatus::Pass);
    }

    #[test]
    fn unreachable_registry_fails() {
        let check = NpmRegistryRule.evaluate(&with_registry(false, None)).unwrap();
        assert_eq!(check.status, CheckStatus::Fail);
        assert!(check.message.contains("connection refused"));
    }

    #[test]
    fn plain_http_registry_warns() {
        let mut data = HealthData::default();
        assert!(RegistryConfigRule.evaluate(&data).is_none());

        data.registry_config = RegistryInfo {
            url: "http://mirror.internal/".to_string(),
            source: "user .npmrc".to_string(),
        };
        assert_eq!(RegistryConfigRule.evaluate(&data).unwrap().status, CheckStatus::Warn);

        data.registry_config.url = "https://mirror.internal/".to_string();
        assert_eq!(RegistryConfigRule.evaluate(&data).unwrap().status, CheckStatus::Pass);
    }
}
