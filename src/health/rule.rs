//! Health rule definitions and the ordered rule set.

use super::check::{Check, CheckCategory, CheckStatus};
use super::data::HealthData;
use super::rules;

/// A side-effect-free policy over a [`HealthData`] snapshot.
pub trait HealthRule: Send + Sync {
    /// Stable identifier, used in reports.
    fn id(&self) -> &'static str;

    /// Human-readable name.
    fn name(&self) -> &'static str;

    fn category(&self) -> CheckCategory;

    /// Evaluate the rule. `None` means the rule does not apply to this
    /// snapshot (for example, a probe that was skipped).
    fn evaluate(&self, data: &HealthData) -> Option<Check>;

    /// Build a check carrying this rule's identity.
    fn check(&self, status: CheckStatus, message: String) -> Check {
        Check::new(self.id(), self.name(), self.category(), status, message)
    }
}

/// Rules evaluated in registration order.
pub struct RuleSet {
    rules: Vec<Box<dyn HealthRule>>,
}

impl RuleSet {
    /// Create an empty rule set.
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Create a rule set with every built-in rule.
    pub fn with_builtins() -> Self {
        let mut set = Self::new();
        for rule in rules::builtin_rules() {
            set.register(rule);
        }
        set
    }

    pub fn register(&mut self, rule: Box<dyn HealthRule>) {
        self.rules.push(rule);
    }

    pub fn get(&self, id: &str) -> Option<&dyn HealthRule> {
        self.rules.iter().find(|r| r.id() == id).map(|r| r.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn HealthRule> {
        self.rules.iter().map(|r| r.as_ref())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Evaluate every rule against `data`, in order.
    pub fn evaluate(&self, data: &HealthData) -> Vec<Check> {
        self.rules
            .iter()
            .filter_map(|rule| {
                let check = rule.evaluate(data);
                if check.is_none() {
                    tracing::debug!("Rule {} not applicable", rule.id());
                }
                check
            })
            .collect()
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    struct FixedRule {
        id: &'static str,
        status: Option<CheckStatus>,
    }

    impl HealthRule for FixedRule {
        fn id(&self) -> &'static str {
            self.id
        }
        fn name(&self) -> &'static str {
            "Fixed"
        }
        fn category(&self) -> CheckCategory {
            CheckCategory::Runtime
        }
        fn evaluate(&self, _data: &HealthData) -> Option<Check> {
            self.status.map(|s| self.check(s, "fixed".to_string()))
        }
    }

    #[test]
    fn evaluates_in_registration_order_and_skips_inapplicable() {
        let mut set = RuleSet::new();
        set.register(Box::new(FixedRule { id: "b", status: Some(CheckStatus::Warn) }));
        set.register(Box::new(FixedRule { id: "skip", status: None }));
        set.register(Box::new(FixedRule { id: "a", status: Some(CheckStatus::Pass) }));

        let checks = set.evaluate(&HealthData::default());
        let ids: Vec<&str> = checks.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(checks[0].status, CheckStatus::Warn);
    }

    #[test]
    fn builtins_have_unique_ids() {
        let set = RuleSet::with_builtins();
        assert!(set.len() >= 30);
        let ids: HashSet<&str> = set.iter().map(|r| r.id()).collect();
        assert_eq!(ids.len(), set.len());
        assert!(set.get("npm-registry").is_some());
        assert!(set.get("nope").is_none());
    }

    #[test]
    fn builtins_start_with_core_rules() {
        let set = RuleSet::with_builtins();
        let ids: Vec<&str> = set.iter().map(|r| r.id()).take(3).collect();
        assert_eq!(ids, vec!["node-in-path", "version-manager-conflict", "npm-registry"]);
    }
}
