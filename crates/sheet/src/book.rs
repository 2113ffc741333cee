use crate::csv::CsvOptions;
use crate::error::{Result, SheetError};
use crate::sheet::Sheet;
use indexmap::IndexMap;
use std::path::{Path, PathBuf};

/// File formats a [`Book`] can be opened from and saved to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Xlsx,
    Csv,
    Tsv,
}

impl FileFormat {
    /// Detect the format from a path's extension (case-insensitive)
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match ext.as_str() {
            "xlsx" => Ok(FileFormat::Xlsx),
            "csv" => Ok(FileFormat::Csv),
            "tsv" => Ok(FileFormat::Tsv),
            _ => Err(SheetError::UnsupportedFormat(
                path.as_ref().display().to_string(),
            )),
        }
    }

    /// Text options for delimited formats, `None` for xlsx.
    #[must_use]
    pub fn csv_options(self) -> Option<CsvOptions> {
        match self {
            FileFormat::Xlsx => None,
            FileFormat::Csv => Some(CsvOptions::default()),
            FileFormat::Tsv => Some(CsvOptions::tsv()),
        }
    }
}

/// Build the sibling path `<stem><suffix>.<ext>` next to `path`.
///
/// `report.xlsx` with suffix `_updated` becomes `report_updated.xlsx`.
/// A path without an extension just gets the suffix appended.
#[must_use]
pub fn sibling_path<P: AsRef<Path>>(path: P, suffix: &str) -> PathBuf {
    let path = path.as_ref();
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = match path.extension() {
        Some(ext) => format!("{stem}{suffix}.{}", ext.to_string_lossy()),
        None => format!("{stem}{suffix}"),
    };
    path.with_file_name(file_name)
}

/// A book containing multiple sheets (preserves insertion order)
#[derive(Debug, Clone, Default)]
pub struct Book {
    sheets: IndexMap<String, Sheet>,
}

impl Book {
    /// Create a new empty book
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a book from disk, choosing the reader by file extension.
    ///
    /// Delimited files become a single sheet named after the file stem,
    /// with cell text kept verbatim.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Sheet1")
            .to_string();

        let format = FileFormat::from_path(path)?;
        match format.csv_options() {
            None => Book::from_xlsx(path),
            Some(options) => {
                let mut book = Book::new();
                book.add_sheet(&stem, Sheet::from_csv(path, options)?)?;
                Ok(book)
            }
        }
    }

    /// Save a book to disk, choosing the writer by file extension.
    ///
    /// Delimited output holds one sheet, so only the first sheet is written.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        match FileFormat::from_path(path)?.csv_options() {
            None => self.save_as_xlsx(path),
            Some(options) => self.get_sheet_by_index(0)?.save_as_csv(path, options),
        }
    }

    /// Get the number of sheets
    #[must_use]
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Get a sheet by index (0-based)
    pub fn get_sheet_by_index(&self, index: usize) -> Result<&Sheet> {
        self.sheets
            .get_index(index)
            .map(|(_, sheet)| sheet)
            .ok_or_else(|| SheetError::SheetNotFound {
                name: format!("index {index}"),
            })
    }

    /// Get a mutable sheet by index (0-based)
    pub fn get_sheet_by_index_mut(&mut self, index: usize) -> Result<&mut Sheet> {
        self.sheets
            .get_index_mut(index)
            .map(|(_, sheet)| sheet)
            .ok_or_else(|| SheetError::SheetNotFound {
                name: format!("index {index}"),
            })
    }

    // ===== Sheet Management =====

    /// Add a sheet to the book
    pub fn add_sheet(&mut self, name: &str, sheet: Sheet) -> Result<()> {
        if self.sheets.contains_key(name) {
            return Err(SheetError::SheetAlreadyExists {
                name: name.to_string(),
            });
        }

        let mut sheet = sheet;
        sheet.set_name(name);
        self.sheets.insert(name.to_string(), sheet);
        Ok(())
    }

    /// Iterate over sheets in order
    pub fn sheets(&self) -> impl Iterator<Item = (&str, &Sheet)> {
        self.sheets.iter().map(|(k, v)| (k.as_str(), v))
    }
}
