//! Health assessment.
//!
//! A [`HealthCollector`] gathers a [`HealthData`] snapshot from the probes,
//! a [`RuleSet`] turns it into [`Check`] records, and [`summarize`] reduces
//! those to an [`Assessment`] with a CI exit code.
//!
//! # Example
//!
//! ```no_run
//! use node_doctor::detectors::DetectorRegistry;
//! use node_doctor::health::{run_assessment, CollectOptions, HealthCollector, RuleSet};
//! use node_doctor::net::{FeedClient, HttpFetcher, RetryPolicy};
//! use node_doctor::platform::HostEnv;
//!
//! let registry = DetectorRegistry::with_builtins().unwrap();
//! let env = HostEnv::from_process();
//! let results = registry.scan_all(&env);
//! let collector = HealthCollector::new(env, FeedClient::new(HttpFetcher::new(), RetryPolicy::default()));
//! let assessment = run_assessment(
//!     &collector,
//!     &registry,
//!     &results,
//!     &RuleSet::with_builtins(),
//!     CollectOptions::default(),
//!     chrono::Utc::now(),
//! );
//! std::process::exit(assessment.exit_code);
//! ```

pub mod assessment;
pub mod check;
pub mod collector;
pub mod data;
pub mod rule;
pub mod rules;

pub use assessment::{run_assessment, summarize, Assessment, Summary};
pub use check::{Check, CheckCategory, CheckStatus};
pub use collector::{CollectOptions, HealthCollector};
pub use data::{
    EnvVarFlags, FeedStatus, HealthData, InstalledVersionStatus, ManagerInfo, SystemInfo,
};
pub use rule::{HealthRule, RuleSet};
