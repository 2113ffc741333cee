//! Command-driven editing session.
//!
//! A [`Session`] holds everything one run of the tool works on: the tag
//! universe, the loaded workbook, the selected source column with its
//! [`ScanResult`], and the tag currently picked for assignment. Front ends
//! translate user gestures into [`Command`]s and render the [`Outcome`].

use crate::error::{CoreResult, ValidationError};
use crate::evaluate::materialize;
use crate::rule::{ColumnRule, RuleDraft};
use crate::rule_set::RuleSet;
use crate::scan::{classify, scan_column, ScanResult};
use crate::settings::Settings;
use crate::store::ConfigStore;
use crate::tag::Tag;
use crate::universe::TagUniverse;
use std::path::{Path, PathBuf};
use tagsplit_sheet::{
    column_index_to_letters, column_letters_to_index, sibling_path, Book, Sheet,
};
use tracing::{debug, info};

/// A user action on the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Load a workbook, dropping any previous column selection.
    OpenWorkbook(PathBuf),
    /// Pick the source column by letter and scan it.
    SelectColumn(String),
    /// Toggle the tag picked for assignment.
    SelectTag(Tag),
    /// Give the picked tag to a rule.
    AssignTag { rule: String },
    /// Create a rule, or rename/edit one.
    EditRule(RuleDraft),
    DeleteRule(String),
    /// Write the output workbook and the configuration.
    SaveSession,
}

/// What a successful [`Command`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    WorkbookOpened {
        path: PathBuf,
        sheets: usize,
        columns: usize,
    },
    ColumnSelected {
        letter: String,
        new_tags: usize,
        known_unused: usize,
    },
    /// The picked tag after a toggle, `None` when it was cleared.
    TagSelected(Option<Tag>),
    TagAssigned {
        tag: Tag,
        rule: String,
    },
    RuleSaved(String),
    RuleDeleted(ColumnRule),
    Saved {
        output: PathBuf,
        rows: usize,
    },
}

#[derive(Debug)]
struct Workbook {
    path: PathBuf,
    book: Book,
}

#[derive(Debug)]
pub struct Session {
    settings: Settings,
    store: ConfigStore,
    universe: TagUniverse,
    workbook: Option<Workbook>,
    column: Option<usize>,
    scan: ScanResult,
    selected: Option<Tag>,
}

impl Session {
    /// Start a session, loading the configuration named by `settings`.
    ///
    /// An unreadable configuration is moved aside and the session starts
    /// with an empty universe.
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        let store = ConfigStore::new(&settings.config_path);
        let universe = store.load_or_default();
        Self::with_universe(settings, universe)
    }

    /// Start a session on an already loaded universe.
    #[must_use]
    pub fn with_universe(settings: Settings, universe: TagUniverse) -> Self {
        Self {
            store: ConfigStore::new(&settings.config_path),
            settings,
            universe,
            workbook: None,
            column: None,
            scan: ScanResult::default(),
            selected: None,
        }
    }

    /// Apply one command. On error the session is unchanged.
    pub fn apply(&mut self, command: Command) -> CoreResult<Outcome> {
        debug!(?command, "Applying command");
        match command {
            Command::OpenWorkbook(path) => self.open_workbook(path),
            Command::SelectColumn(letter) => self.select_column(&letter),
            Command::SelectTag(tag) => self.select_tag(tag),
            Command::AssignTag { rule } => self.assign_selected(rule),
            Command::EditRule(draft) => {
                let name = draft.name.trim().to_string();
                self.universe.upsert_rule(&mut self.scan, draft)?;
                Ok(Outcome::RuleSaved(name))
            }
            Command::DeleteRule(name) => {
                let rule = self.universe.delete_rule(&mut self.scan, &name)?;
                Ok(Outcome::RuleDeleted(rule))
            }
            Command::SaveSession => self.save(),
        }
    }

    fn open_workbook(&mut self, path: PathBuf) -> CoreResult<Outcome> {
        let book = Book::open(&path)?;
        let columns = book.get_sheet_by_index(0).map_or(0, Sheet::col_count);
        let sheets = book.sheet_count();

        info!(path = %path.display(), sheets, columns, "Opened workbook");
        self.workbook = Some(Workbook {
            path: path.clone(),
            book,
        });
        self.column = None;
        self.scan = ScanResult::default();
        self.selected = None;

        Ok(Outcome::WorkbookOpened {
            path,
            sheets,
            columns,
        })
    }

    fn select_column(&mut self, letter: &str) -> CoreResult<Outcome> {
        let sheet = self.first_sheet()?;
        let width = sheet.col_count();
        if width == 0 {
            return Err(ValidationError::NoColumns.into());
        }
        let invalid = || ValidationError::InvalidColumn {
            letter: letter.trim().to_string(),
            last: column_index_to_letters(width.saturating_sub(1)),
        };

        let index = column_letters_to_index(letter).map_err(|_| invalid())?;
        if index >= width {
            return Err(invalid().into());
        }

        let sheet_tags = scan_column(sheet, index, None);
        let scan = classify(&self.universe, &sheet_tags);
        let letter = column_index_to_letters(index);
        info!(
            column = %letter,
            new = scan.new_tags().len(),
            known = scan.known_unused().len(),
            "Selected source column"
        );

        let outcome = Outcome::ColumnSelected {
            letter,
            new_tags: scan.new_tags().len(),
            known_unused: scan.known_unused().len(),
        };
        self.column = Some(index);
        self.scan = scan;
        self.selected = None;
        Ok(outcome)
    }

    fn select_tag(&mut self, tag: Tag) -> CoreResult<Outcome> {
        if self.selected.as_deref() == Some(tag.as_str()) {
            self.selected = None;
            return Ok(Outcome::TagSelected(None));
        }
        if !self.scan.offers(&tag) {
            return Err(ValidationError::TagNotAvailable(tag).into());
        }
        self.selected = Some(tag.clone());
        Ok(Outcome::TagSelected(Some(tag)))
    }

    fn assign_selected(&mut self, rule: String) -> CoreResult<Outcome> {
        let tag = self.selected.clone().ok_or(ValidationError::NoTagSelected)?;
        self.universe.assign_tag(&mut self.scan, &tag, &rule)?;
        self.selected = None;
        Ok(Outcome::TagAssigned { tag, rule })
    }

    /// Materialize the rules into a copy of the workbook, write it next to
    /// the input, then persist the configuration.
    fn save(&mut self) -> CoreResult<Outcome> {
        let workbook = self.workbook.as_ref().ok_or(ValidationError::NoWorkbook)?;
        let column = self.column.ok_or(ValidationError::NoColumnSelected)?;

        let mut book = workbook.book.clone();
        let rows = materialize(book.get_sheet_by_index_mut(0)?, column, self.universe.rules())?;
        let output = sibling_path(&workbook.path, &self.settings.output_suffix);
        book.save(&output)?;

        self.store.save(&self.universe, &self.scan)?;
        self.universe.absorb_pending(&mut self.scan);

        info!(output = %output.display(), rows, "Saved session");
        Ok(Outcome::Saved { output, rows })
    }

    fn first_sheet(&self) -> CoreResult<&Sheet> {
        let workbook = self.workbook.as_ref().ok_or(ValidationError::NoWorkbook)?;
        Ok(workbook.book.get_sheet_by_index(0)?)
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub fn universe(&self) -> &TagUniverse {
        &self.universe
    }

    /// Rules in rule order.
    #[must_use]
    pub fn rules(&self) -> &RuleSet {
        self.universe.rules()
    }

    /// New tags of the current column not yet given to a rule.
    #[must_use]
    pub fn pending_new(&self) -> &[Tag] {
        self.scan.new_tags()
    }

    /// Known unassigned tags that occur in the current column.
    #[must_use]
    pub fn known_unused(&self) -> &[Tag] {
        self.scan.known_unused()
    }

    #[must_use]
    pub fn selected_tag(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Letter of the selected source column.
    #[must_use]
    pub fn selected_column(&self) -> Option<String> {
        self.column.map(column_index_to_letters)
    }

    #[must_use]
    pub fn workbook_path(&self) -> Option<&Path> {
        self.workbook.as_ref().map(|w| w.path.as_path())
    }

    /// Column letters of the first sheet that can be chosen as source.
    #[must_use]
    pub fn columns(&self) -> Vec<String> {
        self.first_sheet()
            .map(|sheet| (0..sheet.col_count()).map(column_index_to_letters).collect())
            .unwrap_or_default()
    }

    /// Header text of every selectable column, aligned with [`Session::columns`].
    #[must_use]
    pub fn headers(&self) -> Vec<String> {
        self.first_sheet()
            .map(|sheet| {
                (0..sheet.col_count())
                    .map(|col| sheet.cell(0, col).as_str())
                    .collect()
            })
            .unwrap_or_default()
    }
}
