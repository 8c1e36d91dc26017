//! Built-in health rules.
//!
//! Rules are grouped by what they inspect. [`builtin_rules`] fixes the
//! evaluation order: the core runtime and network checks first, then the
//! system checks, then the extended heuristics.

pub mod environment;
pub mod extended;
pub mod managers;
pub mod network;
pub mod project;
pub mod runtime;
pub mod security;

pub use environment::{GlobalPackagesRule, NpmAvailableRule, PermissionsRule, PortConflictsRule};
pub use extended::{
    CacheHealthRule, EnginesComplianceRule, GlobalRootRule, IdeIntegrationRule,
    NativeBuildToolsRule, NpmPrefixRule, ShellStartupRule, StaleNativeDepsRule,
    SymlinkSupportRule, VersionFileConflictsRule,
};
pub use managers::{
    DuplicateVersionsRule, ManagerDefaultVersionRule, ManagerEnvRule, ShellConfigManagersRule,
    VersionManagerConflictRule,
};
pub use network::{NpmRegistryRule, RegistryConfigRule};
pub use project::{CorepackRule, LockfileConflictsRule, NodeVersionPinRule};
pub use runtime::{NodeArchRule, NodeEnvVarsRule, NodeInPathRule};
pub use security::{InstalledEolRule, InstalledSecurityRule, NodeEolRule, NodeSecurityRule};

use super::HealthRule;
use crate::version;

/// Every built-in rule, in evaluation order.
pub fn builtin_rules() -> Vec<Box<dyn HealthRule>> {
    vec![
        Box::new(NodeInPathRule),
        Box::new(VersionManagerConflictRule),
        Box::new(NpmRegistryRule),
        Box::new(NodeEolRule),
        Box::new(InstalledEolRule),
        Box::new(NodeSecurityRule),
        Box::new(InstalledSecurityRule),
        Box::new(PortConflictsRule),
        Box::new(DuplicateVersionsRule),
        Box::new(ShellConfigManagersRule),
        Box::new(NodeEnvVarsRule),
        Box::new(NpmAvailableRule),
        Box::new(GlobalPackagesRule),
        Box::new(PermissionsRule),
        Box::new(CorepackRule),
        Box::new(RegistryConfigRule),
        Box::new(NodeArchRule),
        Box::new(ManagerDefaultVersionRule),
        Box::new(ManagerEnvRule),
        Box::new(LockfileConflictsRule),
        Box::new(NodeVersionPinRule),
        Box::new(NpmPrefixRule),
        Box::new(ShellStartupRule),
        Box::new(VersionFileConflictsRule),
        Box::new(EnginesComplianceRule),
        Box::new(NativeBuildToolsRule),
        Box::new(CacheHealthRule),
        Box::new(GlobalRootRule),
        Box::new(SymlinkSupportRule),
        Box::new(StaleNativeDepsRule),
        Box::new(IdeIntegrationRule),
    ]
}

/// `v`-prefixed version for messages.
pub(crate) fn display_version(v: &str) -> String {
    format!("v{}", version::normalize(v))
}
