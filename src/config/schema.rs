//! Configuration schema.
//!
//! Maps the YAML config file format. Every key is optional; accessors fall
//! back to the built-in defaults.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::net::{DEFAULT_DIST_INDEX_URL, DEFAULT_SCHEDULE_URL};

/// Default per-request timeout for feed downloads.
pub const DEFAULT_NETWORK_TIMEOUT_SECS: u64 = 10;

/// Root configuration structure for `.node-doctor.yml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DoctorConfig {
    /// Registry to probe instead of the one npm is configured with.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registry_url: Option<String>,

    /// Release schedule feed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule_url: Option<String>,

    /// Distribution index feed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dist_index_url: Option<String>,

    /// Per-request timeout for feed downloads, in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_timeout_secs: Option<u64>,

    /// Skip the listening-port probe.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_ports: Option<bool>,

    /// Skip the shell profile scan.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_shell: Option<bool>,
}

impl DoctorConfig {
    pub fn schedule_url(&self) -> &str {
        self.schedule_url.as_deref().unwrap_or(DEFAULT_SCHEDULE_URL)
    }

    pub fn dist_index_url(&self) -> &str {
        self.dist_index_url.as_deref().unwrap_or(DEFAULT_DIST_INDEX_URL)
    }

    pub fn network_timeout(&self) -> Duration {
        Duration::from_secs(
            self.network_timeout_secs
                .unwrap_or(DEFAULT_NETWORK_TIMEOUT_SECS),
        )
    }

    pub fn skip_ports(&self) -> bool {
        self.skip_ports.unwrap_or(false)
    }

    pub fn skip_shell(&self) -> bool {
        self.skip_shell.unwrap_or(false)
    }
}
