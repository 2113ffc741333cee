//! Extracting and classifying the tags of a source column.

use crate::tag::{insert_sorted, parse_tags, remove_sorted, sorted_for_display, Tag};
use crate::universe::TagUniverse;
use std::collections::BTreeSet;
use tagsplit_sheet::Sheet;
use tracing::{debug, warn};

/// First data row; row 0 holds the headers.
pub const FIRST_DATA_ROW: usize = 1;

/// Tags of the current column selection, split into the pools the user
/// assigns from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult {
    /// Never-seen tags that no rule owns yet, display-sorted.
    new_tags: Vec<Tag>,
    /// Known tags in `unused` offered for assignment, display-sorted.
    known_unused: Vec<Tag>,
    /// Every tag that was new when the column was scanned.
    discovered: BTreeSet<Tag>,
}

impl ScanResult {
    /// Pending pool of new tags.
    #[must_use]
    pub fn new_tags(&self) -> &[Tag] {
        &self.new_tags
    }

    /// Pool of known, unassigned tags.
    #[must_use]
    pub fn known_unused(&self) -> &[Tag] {
        &self.known_unused
    }

    /// Whether `tag` was first seen in this scan.
    #[must_use]
    pub fn is_discovered(&self, tag: &str) -> bool {
        self.discovered.contains(tag)
    }

    /// Whether `tag` can be picked for assignment.
    #[must_use]
    pub fn offers(&self, tag: &str) -> bool {
        self.new_tags.iter().any(|t| t == tag) || self.known_unused.iter().any(|t| t == tag)
    }

    pub(crate) fn take_new(&mut self, tag: &str) -> bool {
        remove_sorted(&mut self.new_tags, tag)
    }

    pub(crate) fn take_known(&mut self, tag: &str) -> bool {
        remove_sorted(&mut self.known_unused, tag)
    }

    pub(crate) fn put_new(&mut self, tag: &str) {
        insert_sorted(&mut self.new_tags, tag);
    }

    pub(crate) fn put_known(&mut self, tag: &str) {
        insert_sorted(&mut self.known_unused, tag);
    }

    /// Treat every pending new tag as known from now on: the pending pool
    /// moves into the known pool and nothing counts as discovered anymore.
    /// Returns the moved tags.
    pub(crate) fn settle(&mut self) -> Vec<Tag> {
        let pending = std::mem::take(&mut self.new_tags);
        for tag in &pending {
            insert_sorted(&mut self.known_unused, tag);
        }
        self.discovered.clear();
        pending
    }
}

/// Collect the distinct tags of `column` over the data rows.
///
/// `rows` bounds the data rows scanned (`None` scans to the end). A column
/// that is missing or holds no tags yields an empty set.
pub fn scan_column(sheet: &Sheet, column: usize, rows: Option<usize>) -> BTreeSet<Tag> {
    let end = rows.map_or(sheet.row_count(), |n| {
        FIRST_DATA_ROW.saturating_add(n).min(sheet.row_count())
    });

    let mut tags = BTreeSet::new();
    if column < sheet.col_count() {
        for row in FIRST_DATA_ROW..end {
            let cell = sheet.cell(row, column);
            if !cell.is_blank() {
                tags.extend(parse_tags(&cell.as_str()));
            }
        }
    }

    if tags.is_empty() {
        warn!(
            sheet = sheet.name(),
            column, "Source column holds no tags; treating it as empty"
        );
    } else {
        debug!(sheet = sheet.name(), column, count = tags.len(), "Scanned tags");
    }
    tags
}

/// Split the tags found in a sheet into new and known-unused pools.
///
/// Tags already owned by a rule appear in neither pool.
#[must_use]
pub fn classify(universe: &TagUniverse, sheet_tags: &BTreeSet<Tag>) -> ScanResult {
    let known = universe.all_known_tags();
    let discovered: BTreeSet<Tag> = sheet_tags.difference(&known).cloned().collect();
    let known_unused = sorted_for_display(sheet_tags.intersection(universe.unused()));

    ScanResult {
        new_tags: sorted_for_display(&discovered),
        known_unused,
        discovered,
    }
}
