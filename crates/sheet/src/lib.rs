//! Sheet/Book module for tagsplit
//!
//! An in-memory workbook model with just enough surface for reading a tag
//! column and writing derived columns back: cell access, column insertion,
//! A1 column letters, and xlsx/csv/tsv I/O.
//!
//! # Examples
//!
//! ```
//! use tagsplit_sheet::{Sheet, CellValue};
//!
//! let mut sheet = Sheet::from_data(vec![
//!     vec!["Name", "Tags"],
//!     vec!["Alice", "red, blue"],
//! ]);
//!
//! sheet.column_insert(2, vec!["Color", "red"]).unwrap();
//! assert_eq!(sheet.col_count(), 3);
//! assert_eq!(sheet.cell(1, 2), &CellValue::from("red"));
//! ```
//!
//! ## Opening and saving
//!
//! ```no_run
//! use tagsplit_sheet::{sibling_path, Book};
//!
//! let book = Book::open("report.xlsx").unwrap();
//! book.save(sibling_path("report.xlsx", "_updated")).unwrap();
//! ```

mod a1_notation;
mod book;
mod cell;
mod csv;
mod error;
mod sheet;
mod xlsx;

/// Re-export A1 helpers used to address columns by letter.
pub use a1_notation::{column_index_to_letters, column_letters_to_index};
/// Re-export book types.
pub use book::{sibling_path, Book, FileFormat};
/// Re-export cell value type.
pub use cell::CellValue;
/// Re-export CSV options.
pub use csv::CsvOptions;
/// Re-export sheet error types.
pub use error::{Result, SheetError};
/// Re-export sheet type.
pub use sheet::Sheet;
