//! # tagsplit-core
//!
//! Tag classification engine for tagsplit.
//!
//! A spreadsheet column holds free-form, comma-separated tags. Users group
//! tags into [`ColumnRule`]s; each rule becomes one derived output column
//! whose value depends on which of its tags a row carries.
//!
//! This crate provides:
//! - The [`TagUniverse`] and its edit operations
//! - Column scanning and tag classification
//! - Rule evaluation and output column materialization
//! - Configuration persistence
//! - A command-driven [`Session`] for front ends
//!
//! ## Example
//!
//! ```
//! use tagsplit_core::{evaluate_row, ColumnRule, RuleSet};
//!
//! let mut color = ColumnRule::new("Color", "none", "[all]");
//! color.owned_tags.insert("red".to_string());
//! color.owned_tags.insert("blue".to_string());
//! let rules: RuleSet = std::iter::once(color).collect();
//!
//! assert_eq!(evaluate_row(&rules, "red, wood"), Some(vec!["red".to_string()]));
//! assert_eq!(evaluate_row(&rules, "blue,red"), Some(vec!["blue, red".to_string()]));
//! assert_eq!(evaluate_row(&rules, ""), None);
//! ```

/// Error types and result aliases.
pub mod error;
/// Rule evaluation and output materialization.
pub mod evaluate;
pub mod rule;
pub mod rule_set;
/// Column scanning and tag classification.
pub mod scan;
pub mod session;
pub mod settings;
/// Configuration persistence.
pub mod store;
pub mod tag;
pub mod universe;

pub use error::{CoreError, CoreResult, PersistenceError, ValidationError};
pub use evaluate::{evaluate_row, evaluate_rule, materialize};
pub use rule::{ColumnRule, RuleDraft, ALL_SENTINEL};
pub use rule_set::RuleSet;
pub use scan::{classify, scan_column, ScanResult, FIRST_DATA_ROW};
pub use session::{Command, Outcome, Session};
pub use settings::Settings;
pub use store::ConfigStore;
pub use tag::{parse_tags, Tag};
pub use universe::TagUniverse;
