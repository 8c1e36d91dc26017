//! node-doctor - Diagnose a machine's Node.js toolchain.
//!
//! node-doctor finds every Node.js runtime a machine has, whether it came
//! from a version manager, Homebrew or the system package manager, and
//! runs a suite of health checks over PATH, the npm registry, release
//! feeds, shell profiles, package-manager caches and permissions.
//!
//! # Modules
//!
//! - [`detectors`] - Detector trait, built-in detectors and the registry
//! - [`aggregate`] - Flattened installation lists and duplicate detection
//! - [`probes`] - Read-only probes of the host (PATH, ports, shells, npm)
//! - [`net`] - HTTP client, retry policy and release feeds
//! - [`health`] - Health data collection, rules and assessment
//! - [`report`] - Text and JSON report formatters
//! - [`config`] - YAML configuration loading
//! - [`cli`] - Command-line interface and argument parsing
//! - [`ui`] - Terminal output
//! - [`platform`] - Platform tags and the host environment snapshot
//! - [`sys`] - Filesystem and subprocess helpers
//! - [`version`] - Version normalization and comparison
//! - [`error`] - Error types and result aliases
//!
//! # Example
//!
//! ```
//! use node_doctor::health::{summarize, Check, CheckCategory, CheckStatus, HealthData};
//!
//! let checks = vec![
//!     Check::new("node-in-path", "Node.js in PATH", CheckCategory::Runtime, CheckStatus::Pass, "Node v20.11.0"),
//!     Check::new("npm-registry", "npm registry", CheckCategory::Network, CheckStatus::Fail, "Registry unreachable"),
//! ];
//! let assessment = summarize(checks, HealthData::default(), chrono::Utc::now());
//! assert_eq!(assessment.exit_code, 1);
//! assert_eq!(assessment.summary.failed, 1);
//! ```

pub mod aggregate;
pub mod cli;
pub mod config;
pub mod detectors;
pub mod error;
pub mod health;
pub mod net;
pub mod platform;
pub mod probes;
pub mod report;
pub mod sys;
pub mod ui;
pub mod version;

pub use error::{DoctorError, Result};
