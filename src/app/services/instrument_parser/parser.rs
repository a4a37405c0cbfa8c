//! Parse pass orchestration
//!
//! One pass runs format detection, decoding, header discovery and row
//! processing for a single file. File-level failures are turned into
//! diagnostics plus [`ParseStatus::Failure`]; they never escape `parse`.

use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use super::decoder::{LabeledTable, RawRow, decode_text, read_rows};
use super::diagnostics::DiagnosticsSink;
use super::format::FormatKind;
use super::header::{DiscoveredHeader, HeaderScan, scan_header};
use super::layouts::{
    PassContext, PassEnd, analyte_columns, analyte_rows, fixed_columns, formula_rows,
    keyword_columns,
};
use super::stats::ParseStats;
use crate::app::models::{Diagnostic, ParseStatus, ResultSet};
use crate::app::services::catalog::SampleCatalog;
use crate::app::services::spreadsheet::{
    CalamineConverter, ConversionError, SpreadsheetConverter,
};
use crate::profiles::{HeaderSentinel, InstrumentProfile, RowLayout};
use crate::{Error, Result};

/// Raw instrument file: name plus content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstrumentFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl InstrumentFile {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk, keeping only its file name
    pub fn read(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .map_err(|e| Error::io(format!("Failed to read file {}", path.display()), e))?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { filename, bytes })
    }
}

/// Everything a parse pass produces
#[derive(Debug, Clone)]
pub struct ParseOutcome {
    pub status: ParseStatus,
    pub results: ResultSet,
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
    pub logs: Vec<Diagnostic>,
    pub stats: ParseStats,
}

impl ParseOutcome {
    /// Host status code: 0 on (partial) success, -1 on failure
    pub fn code(&self) -> i32 {
        self.status.code()
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Phase of a parse pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsePhase {
    Init,
    HeaderScan,
    RowProcessing,
    Done,
    Failed,
}

impl ParsePhase {
    /// Whether `next` may follow this phase
    ///
    /// The header is scanned once: nothing leads back to `HeaderScan`.
    pub fn can_advance_to(self, next: ParsePhase) -> bool {
        matches!(
            (self, next),
            (ParsePhase::Init, ParsePhase::HeaderScan)
                | (ParsePhase::HeaderScan, ParsePhase::RowProcessing)
                | (ParsePhase::RowProcessing, ParsePhase::Done)
                | (ParsePhase::Init, ParsePhase::Failed)
                | (ParsePhase::HeaderScan, ParsePhase::Failed)
                | (ParsePhase::RowProcessing, ParsePhase::Failed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ParsePhase::Done | ParsePhase::Failed)
    }

    fn advance(&mut self, next: ParsePhase) {
        debug_assert!(
            self.can_advance_to(next),
            "invalid parse phase transition {} -> {}",
            self,
            next
        );
        debug!("Parse phase {} -> {}", self, next);
        *self = next;
    }
}

impl fmt::Display for ParsePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParsePhase::Init => write!(f, "init"),
            ParsePhase::HeaderScan => write!(f, "header_scan"),
            ParsePhase::RowProcessing => write!(f, "row_processing"),
            ParsePhase::Done => write!(f, "done"),
            ParsePhase::Failed => write!(f, "failed"),
        }
    }
}

/// Instrument result file parser
///
/// Holds only immutable collaborators; every call to [`parse`](Self::parse)
/// builds fresh pass state, so one parser may serve many files.
#[derive(Clone)]
pub struct InstrumentParser {
    profile: InstrumentProfile,
    catalog: Arc<dyn SampleCatalog>,
    converter: Arc<dyn SpreadsheetConverter>,
}

impl fmt::Debug for InstrumentParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstrumentParser")
            .field("profile", &self.profile.name)
            .finish_non_exhaustive()
    }
}

impl InstrumentParser {
    /// Create a parser using the calamine spreadsheet converter
    pub fn new(profile: InstrumentProfile, catalog: Arc<dyn SampleCatalog>) -> Self {
        Self {
            profile,
            catalog,
            converter: Arc::new(CalamineConverter::new()),
        }
    }

    /// Replace the spreadsheet converter
    pub fn with_converter(mut self, converter: Arc<dyn SpreadsheetConverter>) -> Self {
        self.converter = converter;
        self
    }

    pub fn profile(&self) -> &InstrumentProfile {
        &self.profile
    }

    /// Read and parse a file from disk
    pub fn parse_path(&self, path: &Path) -> Result<ParseOutcome> {
        let file = InstrumentFile::read(path)?;
        Ok(self.parse(&file))
    }

    /// Run one parse pass over `file`
    pub fn parse(&self, file: &InstrumentFile) -> ParseOutcome {
        info!(
            "Parsing {} with profile {}",
            file.filename, self.profile.name
        );

        let mut ctx = PassContext::new(&file.filename, &self.profile, self.catalog.as_ref());
        let mut phase = ParsePhase::Init;

        let status = match self.run(file, &mut ctx, &mut phase) {
            Ok(PassEnd::Completed) => {
                phase.advance(ParsePhase::Done);
                ParseStatus::Success
            }
            Ok(PassEnd::Rejected) => {
                phase.advance(ParsePhase::Failed);
                ParseStatus::Failure
            }
            Err(error) => {
                report_file_error(&mut ctx.diagnostics, &error);
                phase.advance(ParsePhase::Failed);
                ParseStatus::Failure
            }
        };

        let (results, diagnostics, stats) = ctx.finish();
        let (errors, warnings, logs) = diagnostics.into_parts();
        info!(
            "Parsed {}: {} ({} records, {} errors, {} warnings)",
            file.filename,
            status,
            stats.records_stored,
            errors.len(),
            warnings.len()
        );

        ParseOutcome {
            status,
            results: results.into_results(),
            errors,
            warnings,
            logs,
            stats,
        }
    }

    fn run(
        &self,
        file: &InstrumentFile,
        ctx: &mut PassContext<'_>,
        phase: &mut ParsePhase,
    ) -> Result<PassEnd> {
        let delimiter = self.profile.delimiter_byte()?;
        let text = self.decode(file, delimiter, &mut ctx.diagnostics)?;
        let rows = read_rows(&text, delimiter, &file.filename)?;
        debug!("Decoded {} rows from {}", rows.len(), file.filename);
        phase.advance(ParsePhase::HeaderScan);

        let end = match &self.profile.layout {
            RowLayout::AnalyteRows(layout) => {
                let table = labeled_table(rows, &file.filename)?;
                phase.advance(ParsePhase::RowProcessing);
                analyte_rows::process(ctx, layout, &table)
            }
            RowLayout::AnalyteColumns(layout) => {
                let table = labeled_table(rows, &file.filename)?;
                phase.advance(ParsePhase::RowProcessing);
                analyte_columns::process(ctx, layout, &table)
            }
            RowLayout::FormulaRows(layout) => {
                let table = labeled_table(rows, &file.filename)?;
                phase.advance(ParsePhase::RowProcessing);
                formula_rows::process(ctx, layout, &table)
            }
            RowLayout::KeywordColumns(layout) => {
                let sentinel = HeaderSentinel::LastToken {
                    token: layout.header_end_token.clone(),
                };
                let scan = locate_header(&rows, &sentinel, &file.filename)?;
                let DiscoveredHeader::Columns(keywords) = &scan.header else {
                    return Err(Error::header_not_found(&file.filename, sentinel.to_string()));
                };
                phase.advance(ParsePhase::RowProcessing);
                keyword_columns::process(ctx, layout, keywords, scan.data_rows(&rows))
            }
            RowLayout::FixedColumns(layout) => {
                let sentinel = HeaderSentinel::FirstTokenPrefix {
                    prefix: layout.header_prefix.clone(),
                    keyword_column: layout.keyword_column,
                };
                let scan = locate_header(&rows, &sentinel, &file.filename)?;
                let DiscoveredHeader::Analyte(keyword) = &scan.header else {
                    return Err(Error::header_not_found(&file.filename, sentinel.to_string()));
                };
                phase.advance(ParsePhase::RowProcessing);
                fixed_columns::process(ctx, layout, keyword, scan.data_rows(&rows))
            }
        };
        Ok(end)
    }

    /// Produce decoded text, converting spreadsheets first
    fn decode(
        &self,
        file: &InstrumentFile,
        delimiter: u8,
        diagnostics: &mut DiagnosticsSink,
    ) -> Result<String> {
        let format = FormatKind::detect(&file.filename);
        debug!("Detected {} format for {}", format, file.filename);

        match format {
            FormatKind::Unknown => Err(Error::unsupported_format(&file.filename)),
            FormatKind::Csv => {
                let decoded = decode_text(&file.bytes);
                if decoded.lossy {
                    diagnostics
                        .warn("${file} is not valid UTF-8, invalid bytes were replaced")
                        .with("file", &file.filename);
                }
                Ok(decoded.text)
            }
            FormatKind::Xls | FormatKind::Xlsx => self.convert(file, format, delimiter),
        }
    }

    /// Try each spreadsheet kind in turn until one conversion succeeds
    fn convert(&self, file: &InstrumentFile, format: FormatKind, delimiter: u8) -> Result<String> {
        let mut missing_sheet = None;
        let mut failures = Vec::new();

        for kind in format.conversion_order() {
            match self
                .converter
                .convert(&file.bytes, kind, &self.profile.sheet, delimiter)
            {
                Ok(text) => {
                    if Some(kind) != format.spreadsheet_kind() {
                        debug!("{} converted as {} after fallback", file.filename, kind);
                    }
                    return Ok(text);
                }
                Err(error) => {
                    debug!("{} conversion of {} failed: {}", kind, file.filename, error);
                    if let ConversionError::SheetNotFound { sheet } = &error {
                        missing_sheet.get_or_insert_with(|| sheet.clone());
                    }
                    failures.push(error.to_string());
                }
            }
        }

        match missing_sheet {
            Some(sheet) => Err(Error::sheet_not_found(sheet)),
            None => Err(Error::conversion(failures.join("; "))),
        }
    }
}

fn labeled_table(rows: Vec<RawRow>, filename: &str) -> Result<LabeledTable> {
    let table = LabeledTable::from_rows(rows)
        .ok_or_else(|| Error::header_not_found(filename, "column header row"))?;
    debug!("{} columns: {}", filename, table.headers().join(", "));
    Ok(table)
}

fn locate_header(rows: &[RawRow], sentinel: &HeaderSentinel, filename: &str) -> Result<HeaderScan> {
    scan_header(rows, sentinel)
        .ok_or_else(|| Error::header_not_found(filename, sentinel.to_string()))
}

/// Record a file-level failure as diagnostics
fn report_file_error(diagnostics: &mut DiagnosticsSink, error: &Error) {
    match error {
        Error::UnsupportedFormat { file } => {
            diagnostics
                .error("${file} is not an XLS, XLSX, or CSV document")
                .with("file", file);
        }
        Error::SheetNotFound { sheet } => {
            diagnostics
                .error("Sheet not found in workbook: ${sheet}")
                .with("sheet", sheet);
            diagnostics.warn("Can't parse input file as XLS, XLSX, or CSV.");
        }
        Error::Conversion { message } => {
            diagnostics
                .warn("Can't parse input file as XLS, XLSX, or CSV.")
                .with("reason", message);
        }
        Error::HeaderNotFound { file, sentinel } => {
            diagnostics
                .error("Header sentinel ${sentinel} not found in ${file}")
                .with("sentinel", sentinel)
                .with("file", file);
        }
        other => {
            diagnostics.error("${message}").with("message", other);
        }
    }
}
