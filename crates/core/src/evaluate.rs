//! Computing derived column values from a row's tags.

use crate::error::CoreResult;
use crate::rule::ColumnRule;
use crate::rule_set::RuleSet;
use crate::scan::FIRST_DATA_ROW;
use crate::tag::{parse_tags, Tag};
use std::collections::BTreeSet;
use tagsplit_sheet::{CellValue, Sheet};
use tracing::info;

/// Value of one rule for a row's tag set.
///
/// No owned tag present gives the default value, exactly one gives that tag,
/// more than one gives the multiple value, or all matches joined with `", "`
/// (sorted) when the rule uses the `[all]` sentinel.
#[must_use]
pub fn evaluate_rule(rule: &ColumnRule, row_tags: &BTreeSet<Tag>) -> String {
    let matched: Vec<&str> = rule
        .owned_tags
        .intersection(row_tags)
        .map(String::as_str)
        .collect();

    match matched.as_slice() {
        [] => rule.default_value.clone(),
        [single] => (*single).to_string(),
        _ if rule.joins_all() => matched.join(", "),
        _ => rule.multiple_value.clone(),
    }
}

/// Values of every rule, in rule order, for one source cell.
///
/// Returns `None` for an empty cell: such rows are left untouched.
#[must_use]
pub fn evaluate_row(rules: &RuleSet, cell_text: &str) -> Option<Vec<String>> {
    if cell_text.trim().is_empty() {
        return None;
    }
    let row_tags = parse_tags(cell_text);
    Some(rules.iter().map(|rule| evaluate_rule(rule, &row_tags)).collect())
}

/// Insert one column per rule right after `source_col`, in rule order.
///
/// The header row gets the rule names; each data row gets its evaluated
/// values, or empty cells when its source cell is empty. Returns the number
/// of data rows that were evaluated.
pub fn materialize(sheet: &mut Sheet, source_col: usize, rules: &RuleSet) -> CoreResult<usize> {
    let row_count = sheet.row_count();
    if row_count == 0 {
        return Ok(0);
    }

    let mut columns: Vec<Vec<CellValue>> = rules
        .iter()
        .map(|rule| {
            let mut column = Vec::with_capacity(row_count);
            column.push(CellValue::from(rule.name.as_str()));
            column
        })
        .collect();

    let mut evaluated = 0;
    for row in FIRST_DATA_ROW..row_count {
        let source = sheet.cell(row, source_col);
        let values = if source.is_blank() {
            None
        } else {
            evaluate_row(rules, &source.as_str())
        };

        match values {
            Some(values) => {
                evaluated += 1;
                for (column, value) in columns.iter_mut().zip(values) {
                    column.push(CellValue::String(value));
                }
            }
            None => {
                for column in &mut columns {
                    column.push(CellValue::Null);
                }
            }
        }
    }

    // Pad so the first inserted column lands right after the source column
    let insert_at = source_col + 1;
    for (offset, column) in columns.into_iter().enumerate() {
        let index = insert_at + offset;
        if index > sheet.col_count() {
            pad_to_width(sheet, index);
        }
        sheet.column_insert(index, column)?;
    }

    info!(
        sheet = sheet.name(),
        rules = rules.len(),
        rows = evaluated,
        "Materialized derived columns"
    );
    Ok(evaluated)
}

fn pad_to_width(sheet: &mut Sheet, width: usize) {
    for row in sheet.data_mut() {
        if row.len() < width {
            row.resize(width, CellValue::Null);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(multiple: &str) -> ColumnRule {
        let mut rule = ColumnRule::new("Color", "none", multiple);
        rule.owned_tags = ["A", "B"].iter().map(|t| (*t).to_string()).collect();
        rule
    }

    fn row(text: &str) -> BTreeSet<Tag> {
        parse_tags(text)
    }

    #[test]
    fn test_single_match_is_the_tag() {
        assert_eq!(evaluate_rule(&rule("[all]"), &row("A")), "A");
        assert_eq!(evaluate_rule(&rule("[all]"), &row("C, A")), "A");
    }

    #[test]
    fn test_no_match_is_default() {
        assert_eq!(evaluate_rule(&rule("[all]"), &row("")), "none");
        assert_eq!(evaluate_rule(&rule("[all]"), &row("C")), "none");
        // matching is exact, not case-insensitive
        assert_eq!(evaluate_rule(&rule("[all]"), &row("a")), "none");
    }

    #[test]
    fn test_multiple_match_policy() {
        assert_eq!(evaluate_rule(&rule("[all]"), &row("B, A")), "A, B");
        assert_eq!(evaluate_rule(&rule("N/A"), &row("A,B")), "N/A");
    }

    #[test]
    fn test_evaluate_row_skips_empty_cells() {
        let rules: RuleSet = std::iter::once(rule("N/A")).collect();
        assert_eq!(evaluate_row(&rules, ""), None);
        assert_eq!(evaluate_row(&rules, "  \n"), None);
        // a cell of only separators is not empty: every rule falls back
        assert_eq!(evaluate_row(&rules, ","), Some(vec!["none".to_string()]));
    }

    #[test]
    fn test_evaluate_is_deterministic() {
        let rules: RuleSet = std::iter::once(rule("[all]")).collect();
        let first = evaluate_row(&rules, "B, A, C");
        for _ in 0..10 {
            assert_eq!(evaluate_row(&rules, "B, A, C"), first);
        }
    }

    #[test]
    fn test_materialize_inserts_after_source() {
        let mut sheet = Sheet::from_data(vec![
            vec!["Item", "Tags", "Price"],
            vec!["lamp", "A", "10"],
            vec!["vase", "", "12"],
            vec!["desk", "A, B", "99"],
        ]);
        let mut size = ColumnRule::new("size", "?", "many");
        size.owned_tags.insert("XL".to_string());
        let rules: RuleSet = vec![size, rule("[all]")].into_iter().collect();

        let evaluated = materialize(&mut sheet, 1, &rules).unwrap();
        assert_eq!(evaluated, 2);

        let header: Vec<String> = sheet.row(0).unwrap().iter().map(CellValue::as_str).collect();
        assert_eq!(header, vec!["Item", "Tags", "Color", "size", "Price"]);
        assert_eq!(sheet.get(1, 2).unwrap().as_str(), "A");
        assert_eq!(sheet.get(1, 3).unwrap().as_str(), "?");
        assert!(sheet.get(2, 2).unwrap().is_null());
        assert!(sheet.get(2, 3).unwrap().is_null());
        assert_eq!(sheet.get(3, 2).unwrap().as_str(), "A, B");
        assert_eq!(sheet.get(3, 4).unwrap().as_str(), "99");
    }

    #[test]
    fn test_materialize_source_beyond_ragged_rows() {
        let mut sheet = Sheet::from_data(vec![vec!["Tags"], vec!["A"]]);
        sheet.data_mut()[0].push(CellValue::Null);
        let rules: RuleSet = std::iter::once(rule("[all]")).collect();

        materialize(&mut sheet, 1, &rules).unwrap();
        assert_eq!(sheet.get(0, 2).unwrap().as_str(), "Color");
        assert!(sheet.get(1, 2).unwrap().is_null());
    }
}
