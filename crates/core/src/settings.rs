//! Session settings.

use std::path::PathBuf;

/// Default configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

/// Default suffix of the output workbook's file stem.
pub const DEFAULT_OUTPUT_SUFFIX: &str = "_updated";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Where the tag universe is persisted.
    pub config_path: PathBuf,
    /// Appended to the input's file stem to name the output workbook.
    pub output_suffix: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
            output_suffix: DEFAULT_OUTPUT_SUFFIX.to_string(),
        }
    }
}

impl Settings {
    #[must_use]
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = path.into();
        self
    }

    #[must_use]
    pub fn with_output_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.output_suffix = suffix.into();
        self
    }
}
