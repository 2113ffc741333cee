//! The set of configured rules, keyed by name.

use crate::rule::ColumnRule;
use crate::tag::{display_cmp, Tag};
use indexmap::IndexMap;
use std::collections::BTreeSet;

/// Rules keyed by name.
///
/// Storage keeps insertion order, but every public iteration is in rule
/// order: case-insensitive by name, exact name as tie-break. Display and
/// output columns both use that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: IndexMap<String, ColumnRule>,
}

impl RuleSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ColumnRule> {
        self.rules.get(name)
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut ColumnRule> {
        self.rules.get_mut(name)
    }

    /// Insert or replace the rule stored under `rule.name`.
    pub(crate) fn insert(&mut self, rule: ColumnRule) {
        self.rules.insert(rule.name.clone(), rule);
    }

    pub(crate) fn remove(&mut self, name: &str) -> Option<ColumnRule> {
        self.rules.shift_remove(name)
    }

    /// Rules in rule order.
    pub fn iter(&self) -> impl Iterator<Item = &ColumnRule> {
        let mut rules: Vec<&ColumnRule> = self.rules.values().collect();
        rules.sort_by(|a, b| display_cmp(&a.name, &b.name));
        rules.into_iter()
    }

    /// Rule names in rule order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.iter().map(|rule| rule.name.as_str()).collect()
    }

    /// Name of the rule that owns `tag`, if any.
    #[must_use]
    pub fn owner_of(&self, tag: &str) -> Option<&str> {
        self.rules
            .values()
            .find(|rule| rule.owned_tags.contains(tag))
            .map(|rule| rule.name.as_str())
    }

    /// Every tag owned by some rule.
    #[must_use]
    pub fn owned_tags(&self) -> BTreeSet<Tag> {
        self.rules
            .values()
            .flat_map(|rule| rule.owned_tags.iter().cloned())
            .collect()
    }
}

impl FromIterator<ColumnRule> for RuleSet {
    fn from_iter<I: IntoIterator<Item = ColumnRule>>(iter: I) -> Self {
        let mut set = RuleSet::new();
        for rule in iter {
            set.insert(rule);
        }
        set
    }
}
