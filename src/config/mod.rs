//! Configuration loading.
//!
//! - Schema definitions in [`schema`]
//! - File discovery, loading and environment overrides in [`loader`]
//! - Layer merging in [`merger`]
//!
//! # Example
//!
//! ```
//! use node_doctor::config::load_config;
//! use node_doctor::platform::{HostEnv, Platform};
//! use std::fs;
//! use tempfile::TempDir;
//!
//! let temp = TempDir::new().unwrap();
//! fs::write(temp.path().join(".node-doctor.yml"), "skip_ports: true").unwrap();
//!
//! let env = HostEnv::new(Platform::Linux, temp.path(), temp.path());
//! let config = load_config(&env, temp.path(), None).unwrap();
//! assert!(config.skip_ports());
//! ```

pub mod loader;
pub mod merger;
pub mod schema;

pub use loader::{
    apply_env_overrides, load_config, load_config_value, ConfigPaths, ENV_PREFIX,
    PROJECT_CONFIG_FILE,
};
pub use merger::{deep_merge, merge_layers};
pub use schema::{DoctorConfig, DEFAULT_NETWORK_TIMEOUT_SECS};
