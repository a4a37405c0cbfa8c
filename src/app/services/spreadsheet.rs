//! Spreadsheet to delimited text conversion
//!
//! Binary workbooks are never parsed by the engine directly. They are
//! converted into delimited text through a [`SpreadsheetConverter`] and then
//! decoded exactly like a CSV file. The shipped converter reads XLS and XLSX
//! workbooks with `calamine` and writes the selected worksheet with `csv`.

use calamine::{Data, Range, Reader, Xls, Xlsx};
use std::fmt;
use std::io::Cursor;
use tracing::debug;

use crate::Error;
use crate::profiles::SheetSelector;

/// Spreadsheet container format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpreadsheetKind {
    Xls,
    Xlsx,
}

impl SpreadsheetKind {
    /// The other spreadsheet kind, tried when a file is mislabeled
    pub fn other(self) -> Self {
        match self {
            SpreadsheetKind::Xls => SpreadsheetKind::Xlsx,
            SpreadsheetKind::Xlsx => SpreadsheetKind::Xls,
        }
    }
}

impl fmt::Display for SpreadsheetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpreadsheetKind::Xls => write!(f, "XLS"),
            SpreadsheetKind::Xlsx => write!(f, "XLSX"),
        }
    }
}

/// Conversion failure, distinguishing a missing worksheet from anything else
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    #[error("Sheet not found in workbook: {sheet}")]
    SheetNotFound { sheet: String },

    #[error("{kind} conversion failed: {message}")]
    Failed {
        kind: SpreadsheetKind,
        message: String,
    },
}

impl ConversionError {
    pub fn failed(kind: SpreadsheetKind, message: impl Into<String>) -> Self {
        Self::Failed {
            kind,
            message: message.into(),
        }
    }
}

impl From<ConversionError> for Error {
    fn from(error: ConversionError) -> Self {
        match error {
            ConversionError::SheetNotFound { sheet } => Error::sheet_not_found(sheet),
            ConversionError::Failed { message, .. } => Error::conversion(message),
        }
    }
}

/// Black-box workbook to delimited text conversion
pub trait SpreadsheetConverter: Send + Sync {
    fn convert(
        &self,
        bytes: &[u8],
        kind: SpreadsheetKind,
        sheet: &SheetSelector,
        delimiter: u8,
    ) -> Result<String, ConversionError>;
}

/// Converter backed by the `calamine` workbook readers
#[derive(Debug, Clone, Copy, Default)]
pub struct CalamineConverter;

impl CalamineConverter {
    pub fn new() -> Self {
        Self
    }

    fn read_sheet<R>(
        workbook: &mut R,
        kind: SpreadsheetKind,
        sheet: &SheetSelector,
    ) -> Result<Range<Data>, ConversionError>
    where
        R: Reader<Cursor<Vec<u8>>>,
        R::Error: fmt::Display,
    {
        let names = workbook.sheet_names();
        let index = match sheet {
            SheetSelector::Index(index) if *index < names.len() => *index,
            SheetSelector::Name(name) => names
                .iter()
                .position(|candidate| candidate == name)
                .ok_or_else(|| ConversionError::SheetNotFound {
                    sheet: name.clone(),
                })?,
            SheetSelector::Index(index) => {
                return Err(ConversionError::SheetNotFound {
                    sheet: index.to_string(),
                });
            }
        };

        workbook
            .worksheet_range_at(index)
            .ok_or_else(|| ConversionError::SheetNotFound {
                sheet: sheet.to_string(),
            })?
            .map_err(|e| ConversionError::failed(kind, format!("Failed to read worksheet: {}", e)))
    }

    fn write_delimited(
        range: &Range<Data>,
        kind: SpreadsheetKind,
        delimiter: u8,
    ) -> Result<String, ConversionError> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .from_writer(Vec::new());

        for row in range.rows() {
            let cells: Vec<String> = row.iter().map(|cell| cell.to_string()).collect();
            writer
                .write_record(&cells)
                .map_err(|e| ConversionError::failed(kind, e.to_string()))?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| ConversionError::failed(kind, e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| ConversionError::failed(kind, e.to_string()))
    }
}

impl SpreadsheetConverter for CalamineConverter {
    fn convert(
        &self,
        bytes: &[u8],
        kind: SpreadsheetKind,
        sheet: &SheetSelector,
        delimiter: u8,
    ) -> Result<String, ConversionError> {
        let cursor = Cursor::new(bytes.to_vec());
        let range = match kind {
            SpreadsheetKind::Xls => {
                let mut workbook = Xls::new(cursor).map_err(|e| {
                    ConversionError::failed(kind, format!("Failed to open workbook: {}", e))
                })?;
                Self::read_sheet(&mut workbook, kind, sheet)?
            }
            SpreadsheetKind::Xlsx => {
                let mut workbook = Xlsx::new(cursor).map_err(|e| {
                    ConversionError::failed(kind, format!("Failed to open workbook: {}", e))
                })?;
                Self::read_sheet(&mut workbook, kind, sheet)?
            }
        };

        debug!(
            "Converted {} worksheet '{}' ({} rows)",
            kind,
            sheet,
            range.height()
        );
        Self::write_delimited(&range, kind, delimiter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_other_kind() {
        assert_eq!(SpreadsheetKind::Xls.other(), SpreadsheetKind::Xlsx);
        assert_eq!(SpreadsheetKind::Xlsx.other(), SpreadsheetKind::Xls);
    }

    #[test]
    fn test_garbage_bytes_fail_both_kinds() {
        let converter = CalamineConverter::new();
        let bytes = b"not a workbook at all";
        for kind in [SpreadsheetKind::Xls, SpreadsheetKind::Xlsx] {
            let result = converter.convert(bytes, kind, &SheetSelector::default(), b',');
            assert!(matches!(result, Err(ConversionError::Failed { .. })));
        }
    }

    #[test]
    fn test_conversion_error_maps_to_crate_error() {
        let error: Error = ConversionError::SheetNotFound {
            sheet: "Results".to_string(),
        }
        .into();
        assert_eq!(error.to_string(), "Sheet not found in workbook: Results");

        let error: Error = ConversionError::failed(SpreadsheetKind::Xls, "bad header").into();
        assert!(matches!(error, Error::Conversion { .. }));
    }
}
