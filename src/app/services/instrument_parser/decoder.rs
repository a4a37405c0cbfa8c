//! Tabular decoding of delimited text
//!
//! Text is split into positional [`RawRow`]s with a flexible CSV reader
//! (rows may have different lengths). Labeled layouts then wrap the rows in a
//! [`LabeledTable`] that treats the first row as column labels; free-header
//! layouts hand the rows to the header scanner instead.

use std::borrow::Cow;

use crate::constants::UTF8_BOM;
use crate::{Error, Result};

/// One decoded line: positional cells plus source context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    line_number: u64,
    cells: Vec<String>,
    line: String,
}

impl RawRow {
    pub fn new(line_number: u64, cells: Vec<String>, line: impl Into<String>) -> Self {
        Self {
            line_number,
            cells,
            line: line.into(),
        }
    }

    /// 1-based line number in the decoded text
    pub fn line_number(&self) -> u64 {
        self.line_number
    }

    /// Raw text of the line
    pub fn line(&self) -> &str {
        &self.line
    }

    /// Trimmed cell at `index`, empty when the row is shorter
    pub fn cell(&self, index: usize) -> &str {
        self.cells.get(index).map(|cell| cell.trim()).unwrap_or("")
    }

    /// Trimmed cells in order
    pub fn cells(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|cell| cell.trim())
    }

    /// Trimmed cells from `start` onwards
    pub fn cells_from(&self, start: usize) -> Vec<&str> {
        self.cells().skip(start).collect()
    }

    /// Number of cells, including empty ones
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// True when every cell is empty after trimming
    pub fn is_blank(&self) -> bool {
        self.cells().all(str::is_empty)
    }
}

/// Decoded file text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    pub text: String,

    /// True when invalid UTF-8 sequences were replaced
    pub lossy: bool,
}

/// Decode raw bytes as UTF-8, replacing invalid sequences and stripping a BOM
pub fn decode_text(bytes: &[u8]) -> DecodedText {
    let (text, lossy) = match String::from_utf8_lossy(bytes) {
        Cow::Borrowed(text) => (text.to_string(), false),
        Cow::Owned(text) => (text, true),
    };

    let text = match text.strip_prefix(UTF8_BOM) {
        Some(stripped) => stripped.to_string(),
        None => text,
    };

    DecodedText { text, lossy }
}

/// Split delimited text into positional rows
///
/// Empty lines are dropped by the reader; line numbers refer to the text.
pub fn read_rows(text: &str, delimiter: u8, file: &str) -> Result<Vec<RawRow>> {
    let lines: Vec<&str> = text.lines().collect();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let record = result.map_err(|e| {
            Error::csv_parsing(file, format!("Failed to read record {}", index + 1), Some(e))
        })?;

        let line_number = record
            .position()
            .map(|position| line_at(text, position.byte()))
            .unwrap_or(index as u64 + 1);
        let line = usize::try_from(line_number)
            .ok()
            .and_then(|number| number.checked_sub(1))
            .and_then(|offset| lines.get(offset))
            .copied()
            .unwrap_or_default();

        rows.push(RawRow::new(
            line_number,
            record.iter().map(str::to_string).collect(),
            line,
        ));
    }

    Ok(rows)
}

/// 1-based line of the record starting at `byte`
///
/// The reader reports a record's position before skipping the empty lines
/// in front of it, so line terminators at `byte` are stepped over first.
fn line_at(text: &str, byte: u64) -> u64 {
    let bytes = text.as_bytes();
    let mut start = usize::try_from(byte).unwrap_or(bytes.len()).min(bytes.len());
    while matches!(bytes.get(start), Some(b'\n' | b'\r')) {
        start += 1;
    }
    bytes[..start].iter().filter(|&&b| b == b'\n').count() as u64 + 1
}

/// Rows whose first row holds the column labels
#[derive(Debug, Clone)]
pub struct LabeledTable {
    headers: Vec<String>,
    rows: Vec<RawRow>,
}

impl LabeledTable {
    /// Split off the header row; `None` when there are no rows at all
    pub fn from_rows(mut rows: Vec<RawRow>) -> Option<Self> {
        if rows.is_empty() {
            return None;
        }
        let header_row = rows.remove(0);
        let headers = header_row.cells().map(str::to_string).collect();
        Some(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Data rows as label lookups
    pub fn records(&self) -> impl Iterator<Item = LabeledRow<'_>> {
        self.rows.iter().map(|row| LabeledRow {
            headers: &self.headers,
            row,
        })
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A data row viewed through the table's column labels
#[derive(Debug, Clone, Copy)]
pub struct LabeledRow<'a> {
    headers: &'a [String],
    row: &'a RawRow,
}

impl<'a> LabeledRow<'a> {
    /// Trimmed value under `label`, empty when the column is missing
    pub fn get(&self, label: &str) -> &'a str {
        self.headers
            .iter()
            .position(|header| header == label)
            .map(|index| self.row.cell(index))
            .unwrap_or("")
    }

    /// True when the table has a column with this label
    pub fn has_column(&self, label: &str) -> bool {
        self.headers.iter().any(|header| header == label)
    }

    /// (label, value) pairs in column order; cells beyond the labels are ignored
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a str)> {
        let row = self.row;
        self.headers
            .iter()
            .enumerate()
            .map(move |(index, header)| (header.as_str(), row.cell(index)))
    }

    pub fn raw(&self) -> &'a RawRow {
        self.row
    }
}
