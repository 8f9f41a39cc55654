//! Validator configuration

use arcade_core::{Rule, RuleSet};
use serde::{Deserialize, Serialize};

/// Which rules run, and how capability findings count
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// Enabled rules
    pub rules: RuleSet,
    /// Whether TypeChecking findings fail the verdict
    pub capability_is_fatal: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        // the model as stated: every rule, capability findings are warnings
        ValidatorConfig {
            rules: RuleSet::all(),
            capability_is_fatal: false,
        }
    }
}

impl ValidatorConfig {
    /// For partially-populated scenarios: drops the coverage rules that only
    /// hold in a fully-populated history
    pub fn relaxed() -> Self {
        ValidatorConfig {
            rules: RuleSet::all()
                .without(Rule::InterfaceBinding)
                .without(Rule::PortConnectorCoverage)
                .without(Rule::PortInvocationCoverage),
            capability_is_fatal: false,
        }
    }

    /// Every rule, and capability findings fail the verdict
    pub fn strict() -> Self {
        ValidatorConfig {
            rules: RuleSet::all(),
            capability_is_fatal: true,
        }
    }

    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules = self.rules.with(rule);
        self
    }

    pub fn without_rule(mut self, rule: Rule) -> Self {
        self.rules = self.rules.without(rule);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let relaxed = ValidatorConfig::relaxed();
        assert!(relaxed.rules.contains(Rule::ComponentHosting));
        assert!(!relaxed.rules.contains(Rule::PortInvocationCoverage));
        assert!(!relaxed.capability_is_fatal);

        assert!(ValidatorConfig::strict().capability_is_fatal);
        assert_eq!(ValidatorConfig::default().rules, RuleSet::all());
    }
}
