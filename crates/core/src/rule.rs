//! Derived-column definitions.

use crate::tag::Tag;
use std::collections::BTreeSet;

/// Multiple-match value that joins every matched tag instead of a fixed text.
pub const ALL_SENTINEL: &str = "[all]";

/// One derived output column.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnRule {
    /// Column header, unique among rules.
    pub name: String,
    /// Written when none of the owned tags is present.
    pub default_value: String,
    /// Written when more than one owned tag is present; see [`ALL_SENTINEL`].
    pub multiple_value: String,
    /// Tags this rule owns. A tag is owned by at most one rule.
    pub owned_tags: BTreeSet<Tag>,
}

impl ColumnRule {
    /// Create a rule that owns no tags yet.
    pub fn new(
        name: impl Into<String>,
        default_value: impl Into<String>,
        multiple_value: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            default_value: default_value.into(),
            multiple_value: multiple_value.into(),
            owned_tags: BTreeSet::new(),
        }
    }

    /// Whether matches beyond one are joined rather than replaced.
    #[must_use]
    pub fn joins_all(&self) -> bool {
        self.multiple_value == ALL_SENTINEL
    }
}

/// The result of an edit dialog: a new or changed rule.
///
/// `tags` is the final owned set. A draft can only drop tags; new tags are
/// added one at a time through assignment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RuleDraft {
    /// Name of the rule being edited, `None` when creating.
    pub original_name: Option<String>,
    pub name: String,
    pub default_value: String,
    pub multiple_value: String,
    pub tags: BTreeSet<Tag>,
}

impl RuleDraft {
    /// Draft for a brand new rule.
    pub fn create(
        name: impl Into<String>,
        default_value: impl Into<String>,
        multiple_value: impl Into<String>,
    ) -> Self {
        Self {
            original_name: None,
            name: name.into(),
            default_value: default_value.into(),
            multiple_value: multiple_value.into(),
            tags: BTreeSet::new(),
        }
    }

    /// Draft pre-filled from an existing rule.
    #[must_use]
    pub fn edit(rule: &ColumnRule) -> Self {
        Self {
            original_name: Some(rule.name.clone()),
            name: rule.name.clone(),
            default_value: rule.default_value.clone(),
            multiple_value: rule.multiple_value.clone(),
            tags: rule.owned_tags.clone(),
        }
    }

    /// Rename the rule.
    #[must_use]
    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Drop a tag from the final set.
    #[must_use]
    pub fn without_tag(mut self, tag: &str) -> Self {
        self.tags.remove(tag);
        self
    }
}
