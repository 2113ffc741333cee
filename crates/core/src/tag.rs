//! Tag parsing and display ordering.

use std::cmp::Ordering;
use std::collections::BTreeSet;

/// A normalized tag: trimmed, non-empty, compared by exact value.
pub type Tag = String;

/// Split a tag cell into its distinct tags.
///
/// Newlines become spaces, the text is split on commas, every fragment is
/// trimmed and empty fragments are dropped. Matching is case-sensitive.
///
/// ```
/// use tagsplit_core::parse_tags;
///
/// let tags = parse_tags("red, blue,\nlight green,, red");
/// assert_eq!(tags.len(), 3);
/// assert!(tags.contains("light green"));
/// ```
pub fn parse_tags(text: &str) -> BTreeSet<Tag> {
    text.replace(['\r', '\n'], " ")
        .split(',')
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .map(str::to_string)
        .collect()
}

/// Case-insensitive ordering with the exact text as tie-break, so the order is total.
pub fn display_cmp(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Insert `tag` into a display-sorted sequence, keeping it unique and sorted.
pub(crate) fn insert_sorted(pool: &mut Vec<Tag>, tag: &str) {
    if let Err(pos) = pool.binary_search_by(|probe| display_cmp(probe, tag)) {
        pool.insert(pos, tag.to_string());
    }
}

/// Remove `tag` from a display-sorted sequence. Returns whether it was present.
pub(crate) fn remove_sorted(pool: &mut Vec<Tag>, tag: &str) -> bool {
    match pool.binary_search_by(|probe| display_cmp(probe, tag)) {
        Ok(pos) => {
            pool.remove(pos);
            true
        }
        Err(_) => false,
    }
}

/// Collect tags into a display-sorted sequence.
pub(crate) fn sorted_for_display<'a, I>(tags: I) -> Vec<Tag>
where
    I: IntoIterator<Item = &'a Tag>,
{
    let mut out: Vec<Tag> = tags.into_iter().cloned().collect();
    out.sort_by(|a, b| display_cmp(a, b));
    out.dedup();
    out
}
