//! Test utilities and fakes for instrument parser testing
//!
//! Provides a catalog builder, a scripted spreadsheet converter and small
//! profile/parse helpers shared by the component test modules.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::app::models::CanonicalField;
use crate::app::services::catalog::{AnalysisRef, InMemoryCatalog, SampleCatalog};
use crate::app::services::instrument_parser::decoder::{RawRow, read_rows};
use crate::app::services::instrument_parser::{InstrumentFile, InstrumentParser, ParseOutcome};
use crate::app::services::spreadsheet::{ConversionError, SpreadsheetConverter, SpreadsheetKind};
use crate::profiles::{
    AnalyteRowsLayout, CoercionRules, InstrumentProfile, RowLayout, SheetSelector,
};

// Test modules
mod coercion_tests;
mod decoder_tests;
mod diagnostics_tests;
mod keyword_resolver_tests;
mod parser_tests;

/// Analyses without interim fields
pub fn analyses(keywords: &[&str]) -> Vec<AnalysisRef> {
    keywords.iter().map(|keyword| AnalysisRef::new(*keyword)).collect()
}

/// Catalog holding the given samples and their analysis keywords
pub fn catalog_with(samples: &[(&str, &[&str])]) -> InMemoryCatalog {
    samples
        .iter()
        .fold(InMemoryCatalog::new(), |catalog, (id, keywords)| {
            catalog.with_sample(id, analyses(keywords))
        })
}

/// Catalog of the end-to-end scenario: S1 {Pb, Cd}, S2 {Pb}
pub fn create_test_catalog() -> Arc<dyn SampleCatalog> {
    Arc::new(catalog_with(&[("S1", &["Pb", "Cd"]), ("S2", &["Pb"])]))
}

/// Labeled profile with `Sample Id,Analyte,Reading` columns
pub fn create_analyte_rows_profile() -> InstrumentProfile {
    InstrumentProfile {
        name: "test_rows".to_string(),
        title: "Test analyte rows".to_string(),
        delimiter: ',',
        sheet: SheetSelector::default(),
        coercion: CoercionRules::default(),
        unit_rule: None,
        interim_fallback: false,
        layout: RowLayout::AnalyteRows(AnalyteRowsLayout {
            sample_column: "Sample Id".to_string(),
            analyte_column: "Analyte".to_string(),
            value_column: "Reading".to_string(),
            output_field: CanonicalField::Reading,
            reference_fallback: false,
            reference_field: CanonicalField::Result,
        }),
    }
}

/// Parse in-memory text under the given file name
pub fn parse_text(
    profile: InstrumentProfile,
    catalog: Arc<dyn SampleCatalog>,
    filename: &str,
    text: &str,
) -> ParseOutcome {
    let parser = InstrumentParser::new(profile, catalog);
    parser.parse(&InstrumentFile::new(filename, text.as_bytes()))
}

/// Split CSV text into rows, panicking on malformed input
pub fn rows(text: &str) -> Vec<RawRow> {
    read_rows(text, b',', "test.csv").unwrap()
}

/// Rendered messages of a diagnostic list
pub fn messages(diagnostics: &[crate::app::models::Diagnostic]) -> Vec<String> {
    diagnostics.iter().map(|d| d.message()).collect()
}

/// Spreadsheet converter answering from a script and recording attempts
#[derive(Debug, Default)]
pub struct FakeConverter {
    responses: HashMap<SpreadsheetKind, std::result::Result<String, ConversionError>>,
    attempts: Mutex<Vec<SpreadsheetKind>>,
}

impl FakeConverter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Succeed for `kind` with the given delimited text
    pub fn succeeds(mut self, kind: SpreadsheetKind, text: &str) -> Self {
        self.responses.insert(kind, Ok(text.to_string()));
        self
    }

    /// Fail for `kind` with the given error
    pub fn fails(mut self, kind: SpreadsheetKind, error: ConversionError) -> Self {
        self.responses.insert(kind, Err(error));
        self
    }

    /// Kinds attempted so far, in order
    pub fn attempts(&self) -> Vec<SpreadsheetKind> {
        self.attempts.lock().unwrap().clone()
    }
}

impl SpreadsheetConverter for FakeConverter {
    fn convert(
        &self,
        _bytes: &[u8],
        kind: SpreadsheetKind,
        _sheet: &SheetSelector,
        _delimiter: u8,
    ) -> std::result::Result<String, ConversionError> {
        self.attempts.lock().unwrap().push(kind);
        self.responses
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| Err(ConversionError::failed(kind, "not a workbook")))
    }
}
