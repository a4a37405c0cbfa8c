//! File format detection
//!
//! Detection looks at the file extension only. Spreadsheet files are
//! frequently mislabeled by instrument software, so a spreadsheet kind also
//! yields the order in which conversions should be attempted.

use std::fmt;
use std::path::Path;

use crate::app::services::spreadsheet::SpreadsheetKind;
use crate::constants::{CSV_EXTENSION, XLS_EXTENSION, XLSX_EXTENSION};

/// Format of an instrument result file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatKind {
    Csv,
    Xls,
    Xlsx,
    Unknown,
}

impl FormatKind {
    /// Detect the format from the file extension (case-insensitive)
    pub fn detect(filename: &str) -> Self {
        let extension = Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase());

        match extension.as_deref() {
            Some(CSV_EXTENSION) => FormatKind::Csv,
            Some(XLS_EXTENSION) => FormatKind::Xls,
            Some(XLSX_EXTENSION) => FormatKind::Xlsx,
            _ => FormatKind::Unknown,
        }
    }

    /// Spreadsheet kind implied by the extension, if any
    pub fn spreadsheet_kind(self) -> Option<SpreadsheetKind> {
        match self {
            FormatKind::Xls => Some(SpreadsheetKind::Xls),
            FormatKind::Xlsx => Some(SpreadsheetKind::Xlsx),
            FormatKind::Csv | FormatKind::Unknown => None,
        }
    }

    /// Conversion attempts for spreadsheet files: detected kind first, then the other
    pub fn conversion_order(self) -> Vec<SpreadsheetKind> {
        match self.spreadsheet_kind() {
            Some(kind) => vec![kind, kind.other()],
            None => Vec::new(),
        }
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatKind::Csv => write!(f, "CSV"),
            FormatKind::Xls => write!(f, "XLS"),
            FormatKind::Xlsx => write!(f, "XLSX"),
            FormatKind::Unknown => write!(f, "UNKNOWN"),
        }
    }
}
