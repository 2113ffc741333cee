//! Persisting the tag universe between sessions.
//!
//! The record is a JSON document:
//!
//! ```json
//! {
//!   "unused": ["glass", "wood"],
//!   "used": {
//!     "Color": { "default": "none", "multiple": "[all]", "all": ["blue", "red"] }
//!   }
//! }
//! ```

use crate::error::PersistenceError;
use crate::rule::ColumnRule;
use crate::rule_set::RuleSet;
use crate::scan::ScanResult;
use crate::tag::{sorted_for_display, Tag};
use crate::universe::TagUniverse;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{info, warn};

/// On-disk shape of one rule.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RuleRecord {
    #[serde(default)]
    default: String,
    #[serde(default)]
    multiple: String,
    #[serde(default)]
    all: Vec<Tag>,
}

/// On-disk shape of the whole universe.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigRecord {
    #[serde(default)]
    unused: Vec<Tag>,
    #[serde(default)]
    used: IndexMap<String, RuleRecord>,
}

impl ConfigRecord {
    /// Snapshot `universe`, counting the pending new pool as unused.
    fn capture(universe: &TagUniverse, scan: &ScanResult) -> Self {
        let mut unused: BTreeSet<Tag> = universe.unused().clone();
        unused.extend(scan.new_tags().iter().cloned());

        let used = universe
            .rules()
            .iter()
            .map(|rule| {
                let record = RuleRecord {
                    default: rule.default_value.clone(),
                    multiple: rule.multiple_value.clone(),
                    all: sorted_for_display(&rule.owned_tags),
                };
                (rule.name.clone(), record)
            })
            .collect();

        Self {
            unused: sorted_for_display(&unused),
            used,
        }
    }

    fn into_universe(self, path: &Path) -> Result<TagUniverse, PersistenceError> {
        let mut owners: BTreeSet<Tag> = BTreeSet::new();
        let mut rules = RuleSet::new();

        for (name, record) in self.used {
            let mut rule = ColumnRule::new(name, record.default, record.multiple);
            for tag in record.all {
                if !owners.insert(tag.clone()) {
                    return Err(PersistenceError::Conflict {
                        path: path.to_path_buf(),
                        tag,
                    });
                }
                rule.owned_tags.insert(tag);
            }
            rules.insert(rule);
        }

        let mut unused: BTreeSet<Tag> = self.unused.into_iter().collect();
        let shadowed: Vec<Tag> = unused.intersection(&owners).cloned().collect();
        for tag in shadowed {
            warn!(path = %path.display(), tag = %tag, "Tag listed as unused is owned by a rule; keeping the rule");
            unused.remove(&tag);
        }

        Ok(TagUniverse::from_parts(unused, rules))
    }
}

/// Reads and writes the configuration record at a fixed path.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the universe. A missing file is an empty universe.
    pub fn load(&self) -> Result<TagUniverse, PersistenceError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %self.path.display(), "No configuration yet; starting empty");
                return Ok(TagUniverse::new());
            }
            Err(e) => return Err(PersistenceError::io(&self.path, e)),
        };

        let record: ConfigRecord =
            serde_json::from_str(&content).map_err(|source| PersistenceError::Corrupt {
                path: self.path.clone(),
                source,
            })?;
        let universe = record.into_universe(&self.path)?;

        info!(
            path = %self.path.display(),
            rules = universe.rules().len(),
            unused = universe.unused().len(),
            "Loaded configuration"
        );
        Ok(universe)
    }

    /// Startup load that never fails.
    ///
    /// A corrupt or conflicting record is moved aside to the first free
    /// backup name (`<file>.corrupt`, then `<file>.corrupt.1`, ...) and the
    /// session starts with an empty universe. A file that cannot be read at
    /// all is left where it is.
    #[must_use]
    pub fn load_or_default(&self) -> TagUniverse {
        match self.load() {
            Ok(universe) => universe,
            Err(e @ PersistenceError::Io { .. }) => {
                warn!(error = %e, "Configuration unreadable; starting empty");
                TagUniverse::new()
            }
            Err(e) => {
                let backup = self.free_backup_path();
                warn!(error = %e, backup = %backup.display(), "Configuration invalid; starting empty");
                if let Err(rename_err) = std::fs::rename(&self.path, &backup) {
                    warn!(error = %rename_err, "Could not move invalid configuration aside");
                }
                TagUniverse::new()
            }
        }
    }

    /// Base name an invalid record is moved to by
    /// [`ConfigStore::load_or_default`].
    #[must_use]
    pub fn backup_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".corrupt");
        self.path.with_file_name(name)
    }

    fn free_backup_path(&self) -> PathBuf {
        let base = self.backup_path();
        let mut candidate = base.clone();
        let mut n = 0u32;
        while candidate.exists() {
            n += 1;
            let mut name = base.as_os_str().to_os_string();
            name.push(format!(".{n}"));
            candidate = PathBuf::from(name);
        }
        candidate
    }

    /// Write the universe, with the pending new pool folded into `unused`.
    ///
    /// The record is written to a temporary file in the same directory and
    /// renamed over the target, so readers see the old or the new document,
    /// never a partial one. Neither argument is modified.
    pub fn save(&self, universe: &TagUniverse, scan: &ScanResult) -> Result<(), PersistenceError> {
        let record = ConfigRecord::capture(universe, scan);
        let content = serde_json::to_string_pretty(&record).map_err(|source| {
            PersistenceError::Corrupt {
                path: self.path.clone(),
                source,
            }
        })?;

        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut temp_file =
            NamedTempFile::new_in(&parent).map_err(|e| PersistenceError::io(&self.path, e))?;
        temp_file
            .write_all(content.as_bytes())
            .and_then(|()| temp_file.flush())
            .map_err(|e| PersistenceError::io(&self.path, e))?;
        temp_file
            .persist(&self.path)
            .map_err(|e| PersistenceError::io(&self.path, e.error))?;

        info!(
            path = %self.path.display(),
            rules = record.used.len(),
            unused = record.unused.len(),
            "Saved configuration"
        );
        Ok(())
    }
}
