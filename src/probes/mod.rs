//! Environment probes.
//!
//! Each probe inspects one aspect of the host and degrades to empty or
//! unknown data instead of failing. Parsing is kept separate from
//! invocation so it can be tested with captured output.
//!
//! # Modules
//!
//! - [`registry`] - npm registry reachability and configured URL
//! - [`path_scan`] - Runtimes on PATH and their owning manager
//! - [`shell_config`] - Manager initialisation in shell profiles
//! - [`ports`] - Runtime processes holding listening sockets
//! - [`package_managers`] - npm/yarn/pnpm/bun versions and npm config
//! - [`permissions`] - Writability of npm's global and cache directories
//! - [`corepack`] - Corepack availability and shims
//! - [`global_packages`] - Globally installed npm packages
//! - [`project`] - Pins, manifest and lockfiles in the working directory
//! - [`extended`] - Extended heuristics

pub mod corepack;
pub mod extended;
pub mod global_packages;
pub mod package_managers;
pub mod path_scan;
pub mod permissions;
pub mod ports;
pub mod project;
pub mod registry;
pub mod shell_config;

pub use corepack::CorepackStatus;
pub use extended::ExtendedChecks;
pub use global_packages::GlobalPackages;
pub use package_managers::PackageManagers;
pub use path_scan::PathNode;
pub use permissions::PermissionReport;
pub use ports::PortProcess;
pub use project::ProjectInfo;
pub use registry::{RegistryInfo, RegistryStatus};
pub use shell_config::ShellScan;
