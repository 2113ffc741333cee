//! Delimited text (CSV/TSV) reading and writing.

use crate::cell::CellValue;
use crate::error::Result;
use crate::sheet::Sheet;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// How delimited text is read and written.
///
/// Fields are always kept as text: tag cells such as `007` or `yes` must
/// survive a round trip unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvOptions {
    pub delimiter: u8,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl CsvOptions {
    /// Tab-separated values.
    #[must_use]
    pub fn tsv() -> Self {
        Self { delimiter: b'\t' }
    }
}

fn read_field(field: &str) -> CellValue {
    if field.is_empty() {
        CellValue::Null
    } else {
        CellValue::String(field.to_string())
    }
}

impl Sheet {
    /// Read a sheet from a delimited file.
    pub fn from_csv<P: AsRef<Path>>(path: P, options: CsvOptions) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::read_csv(BufReader::new(file), options)
    }

    /// Read a sheet from delimited text. Every record is a row, the header
    /// included; records may differ in length.
    pub fn read_csv<R: Read>(reader: R, options: CsvOptions) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(options.delimiter)
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut sheet = Sheet::new();
        for record in reader.records() {
            let record = record?;
            sheet.row_append(record.iter().map(read_field).collect::<Vec<_>>());
        }
        Ok(sheet)
    }

    /// Write the sheet to a delimited file, replacing it.
    pub fn save_as_csv<P: AsRef<Path>>(&self, path: P, options: CsvOptions) -> Result<()> {
        let file = File::create(path)?;
        self.write_csv(BufWriter::new(file), options)
    }

    pub fn write_csv<W: Write>(&self, writer: W, options: CsvOptions) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(options.delimiter)
            .flexible(true)
            .from_writer(writer);

        for row in self.rows() {
            writer.write_record(row.iter().map(CellValue::as_str))?;
        }
        writer.flush()?;
        Ok(())
    }
}
