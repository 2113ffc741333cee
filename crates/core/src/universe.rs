//! The tag universe and the edit operations that keep it consistent.
//!
//! Every tag the tool has seen lives in exactly one place: the `unused` set,
//! one rule's owned set, or the pending new pool of the current
//! [`ScanResult`]. The operations here move tags between those places and
//! validate before mutating, so a rejected edit leaves everything untouched.

use crate::error::ValidationError;
use crate::rule::{ColumnRule, RuleDraft};
use crate::rule_set::RuleSet;
use crate::scan::ScanResult;
use crate::tag::Tag;
use std::collections::BTreeSet;
use tracing::debug;

/// Every known tag, partitioned into unused tags and rule-owned tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagUniverse {
    unused: BTreeSet<Tag>,
    rules: RuleSet,
}

impl TagUniverse {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(unused: BTreeSet<Tag>, rules: RuleSet) -> Self {
        Self { unused, rules }
    }

    /// Tags known but owned by no rule.
    #[must_use]
    pub fn unused(&self) -> &BTreeSet<Tag> {
        &self.unused
    }

    #[must_use]
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    #[cfg(test)]
    pub(crate) fn unused_mut(&mut self) -> &mut BTreeSet<Tag> {
        &mut self.unused
    }

    #[cfg(test)]
    pub(crate) fn rules_mut(&mut self) -> &mut RuleSet {
        &mut self.rules
    }

    /// `unused` plus every rule's owned tags.
    #[must_use]
    pub fn all_known_tags(&self) -> BTreeSet<Tag> {
        let mut all = self.rules.owned_tags();
        all.extend(self.unused.iter().cloned());
        all
    }

    /// Every tag tracked in this session: known tags plus the pending new pool.
    ///
    /// Edit operations never change this set.
    #[must_use]
    pub fn tracked_tags(&self, scan: &ScanResult) -> BTreeSet<Tag> {
        let mut all = self.all_known_tags();
        all.extend(scan.new_tags().iter().cloned());
        all
    }

    /// Check that no tag has two homes among `unused`, the rules and the
    /// pending new pool.
    #[must_use]
    pub fn is_consistent(&self, scan: &ScanResult) -> bool {
        let mut seen: BTreeSet<&str> = BTreeSet::new();
        let homes = self
            .unused
            .iter()
            .chain(self.rules.iter().flat_map(|rule| rule.owned_tags.iter()))
            .chain(scan.new_tags().iter());
        for tag in homes {
            if !seen.insert(tag.as_str()) {
                return false;
            }
        }
        true
    }

    /// Create a rule, or rename/edit an existing one (`draft.original_name`).
    ///
    /// Tags the draft dropped are released: tags first seen in this scan go
    /// back to the pending new pool, all others to `unused`.
    pub fn upsert_rule(
        &mut self,
        scan: &mut ScanResult,
        draft: RuleDraft,
    ) -> Result<(), ValidationError> {
        let name = draft.name.trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }

        let current = match draft.original_name.as_deref() {
            Some(original) => self
                .rules
                .get(original)
                .map(|rule| rule.owned_tags.clone())
                .ok_or_else(|| ValidationError::UnknownRule(original.to_string()))?,
            None => BTreeSet::new(),
        };

        if draft.original_name.as_deref() != Some(name.as_str()) && self.rules.contains(&name) {
            return Err(ValidationError::DuplicateName(name));
        }

        if let Some(tag) = draft.tags.difference(&current).next() {
            return Err(ValidationError::ForeignTag {
                rule: name,
                tag: tag.clone(),
            });
        }

        if let Some(original) = draft.original_name.as_deref() {
            self.rules.remove(original);
            if original != name {
                debug!(from = original, to = %name, "Renamed rule");
            }
        }

        for tag in current.difference(&draft.tags) {
            self.release(scan, tag);
        }

        debug!(rule = %name, tags = draft.tags.len(), "Saved rule");
        self.rules.insert(ColumnRule {
            name,
            default_value: draft.default_value,
            multiple_value: draft.multiple_value,
            owned_tags: draft.tags,
        });
        Ok(())
    }

    /// Delete a rule, releasing all of its tags. Returns the removed rule.
    pub fn delete_rule(
        &mut self,
        scan: &mut ScanResult,
        name: &str,
    ) -> Result<ColumnRule, ValidationError> {
        let rule = self
            .rules
            .remove(name)
            .ok_or_else(|| ValidationError::UnknownRule(name.to_string()))?;

        for tag in &rule.owned_tags {
            self.release(scan, tag);
        }

        debug!(rule = name, released = rule.owned_tags.len(), "Deleted rule");
        Ok(rule)
    }

    /// Move one tag from the pending new pool or `unused` into a rule.
    pub fn assign_tag(
        &mut self,
        scan: &mut ScanResult,
        tag: &str,
        rule_name: &str,
    ) -> Result<(), ValidationError> {
        if !self.rules.contains(rule_name) {
            return Err(ValidationError::UnknownRule(rule_name.to_string()));
        }
        if self.rules.owner_of(tag).is_some() {
            return Err(ValidationError::TagNotAvailable(tag.to_string()));
        }

        if !scan.take_new(tag) {
            if !self.unused.remove(tag) {
                return Err(ValidationError::TagNotAvailable(tag.to_string()));
            }
            scan.take_known(tag);
        }

        if let Some(rule) = self.rules.get_mut(rule_name) {
            rule.owned_tags.insert(tag.to_string());
        }
        debug!(tag, rule = rule_name, "Assigned tag");
        Ok(())
    }

    /// Remove a tag from the rule that owns it and release it.
    /// Returns the name of the former owner.
    pub fn unassign_tag(
        &mut self,
        scan: &mut ScanResult,
        tag: &str,
    ) -> Result<String, ValidationError> {
        let owner = self
            .rules
            .owner_of(tag)
            .map(str::to_string)
            .ok_or_else(|| ValidationError::TagNotAvailable(tag.to_string()))?;

        if let Some(rule) = self.rules.get_mut(&owner) {
            rule.owned_tags.remove(tag);
        }
        self.release(scan, tag);
        debug!(tag, rule = %owner, "Unassigned tag");
        Ok(owner)
    }

    /// Fold the pending new pool into `unused`, so unassigned new tags are
    /// remembered as known.
    pub fn absorb_pending(&mut self, scan: &mut ScanResult) {
        self.unused.extend(scan.settle());
    }

    fn release(&mut self, scan: &mut ScanResult, tag: &str) {
        if scan.is_discovered(tag) {
            scan.put_new(tag);
        } else {
            scan.put_known(tag);
            self.unused.insert(tag.to_string());
        }
    }
}
