//! Per-target rule selection
//!
//! Every rule in a target's [`RuleSet`] is included unless the
//! [`ExclusionPolicy`] names it for that target. Exclusions are keyed by rule
//! name, so reordering in the upstream catalog never shifts which rule is
//! disabled.

use crate::catalog::RuleSet;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info, warn};

/// Rule names to exclude, per target
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionPolicy {
    by_target: HashMap<String, BTreeSet<String>>,
}

impl ExclusionPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exclude(mut self, target: impl Into<String>, rule: impl Into<String>) -> Self {
        self.insert(target, rule);
        self
    }

    pub fn insert(&mut self, target: impl Into<String>, rule: impl Into<String>) {
        self.by_target
            .entry(target.into())
            .or_default()
            .insert(rule.into());
    }

    pub fn from_pairs<I, T, R>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (T, R)>,
        T: Into<String>,
        R: Into<String>,
    {
        let mut policy = Self::new();
        for (target, rule) in pairs {
            policy.insert(target, rule);
        }
        policy
    }

    pub fn is_excluded(&self, target: &str, rule: &str) -> bool {
        self.by_target
            .get(target)
            .is_some_and(|rules| rules.contains(rule))
    }

    pub fn excluded_for(&self, target: &str) -> impl Iterator<Item = &str> {
        self.by_target
            .get(target)
            .into_iter()
            .flat_map(|rules| rules.iter().map(String::as_str))
    }

    pub fn is_empty(&self) -> bool {
        self.by_target.values().all(BTreeSet::is_empty)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub rule_name: String,
    pub included: bool,
}

/// One entry per rule, in rule set order; never mutated after construction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionResult {
    entries: Vec<Selection>,
}

impl SelectionResult {
    pub fn entries(&self) -> &[Selection] {
        &self.entries
    }

    pub fn included(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|s| s.included)
            .map(|s| s.rule_name.as_str())
    }

    pub fn excluded(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|s| !s.included)
            .map(|s| s.rule_name.as_str())
    }

    /// Flattened `-i <rule>` / `-e <rule>` builder flags
    pub fn to_args(&self) -> Vec<String> {
        self.entries
            .iter()
            .flat_map(|s| {
                let flag = if s.included { "-i" } else { "-e" };
                [flag.to_string(), s.rule_name.clone()]
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SelectionEngine {
    policy: ExclusionPolicy,
}

impl SelectionEngine {
    pub fn new(policy: ExclusionPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ExclusionPolicy {
        &self.policy
    }

    pub fn select(&self, rules: &RuleSet, target: &str) -> SelectionResult {
        info!(app = target, "Excluding patches");

        for name in self.policy.excluded_for(target) {
            if !rules.contains(name) {
                warn!(app = target, rule = name, "Excluded rule is not in the catalog");
            }
        }

        let entries: Vec<Selection> = rules
            .iter()
            .map(|rule| Selection {
                rule_name: rule.name.clone(),
                included: !self.policy.is_excluded(target, &rule.name),
            })
            .collect();

        let result = SelectionResult { entries };
        debug!(
            app = target,
            included = result.included().count(),
            excluded = result.excluded().count(),
            "Rule selection computed"
        );
        result
    }
}
