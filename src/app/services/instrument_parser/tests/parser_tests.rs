//! Tests for parse pass orchestration

use super::*;
use crate::app::models::ParseStatus;
use crate::app::services::instrument_parser::ParsePhase;

const SCENARIO_CSV: &str = "Sample Id,Analyte,Reading\nS1,Pb,12.5\nS1,Cd,--\nS2,Pb,x\n";

fn spreadsheet_parser(converter: Arc<FakeConverter>) -> InstrumentParser {
    InstrumentParser::new(create_analyte_rows_profile(), create_test_catalog())
        .with_converter(converter)
}

#[test]
fn test_end_to_end_scenario() {
    let outcome = parse_text(
        create_analyte_rows_profile(),
        create_test_catalog(),
        "scenario.csv",
        SCENARIO_CSV,
    );

    assert_eq!(outcome.status, ParseStatus::Success);
    assert_eq!(outcome.code(), 0);

    let json = serde_json::to_value(&outcome.results).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "S1": {
                "Pb": {"reading": 12.5, "DefaultResult": "reading"},
                "Cd": {"reading": 0.0, "DefaultResult": "reading"}
            },
            "S2": {}
        })
    );

    assert_eq!(
        messages(&outcome.errors),
        vec!["No valid number x in column (reading)"]
    );
    assert_eq!(outcome.errors[0].line_number, Some(4));
    assert!(outcome.warnings.is_empty());
    assert_eq!(outcome.stats.fields_rejected, 1);
}

#[test]
fn test_line_numbers_count_blank_lines() {
    let outcome = parse_text(
        create_analyte_rows_profile(),
        create_test_catalog(),
        "gaps.csv",
        "Sample Id,Analyte,Reading\n\nS1,Pb,12.5\n\nS2,Pb,x\n",
    );

    assert_eq!(outcome.status, ParseStatus::Success);
    assert_eq!(outcome.results.get("S1", "Pb").unwrap().primary(), Some(12.5));
    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(outcome.errors[0].line_number, Some(5));
    assert_eq!(outcome.errors[0].line.as_deref(), Some("S2,Pb,x"));
}

#[test]
fn test_parse_is_idempotent() {
    let parser = InstrumentParser::new(create_analyte_rows_profile(), create_test_catalog());
    let file = InstrumentFile::new("scenario.csv", SCENARIO_CSV.as_bytes());

    let first = parser.parse(&file);
    let second = parser.parse(&file);

    assert_eq!(first.results, second.results);
    assert_eq!(first.errors, second.errors);
    assert_eq!(first.stats, second.stats);
}

#[test]
fn test_last_write_wins() {
    let text = "Sample Id,Analyte,Reading\nS1,Pb,1.0\nS1,Pb,2.0\n";

    let outcome = parse_text(
        create_analyte_rows_profile(),
        create_test_catalog(),
        "dup.csv",
        text,
    );

    assert_eq!(outcome.results.get("S1", "Pb").unwrap().primary(), Some(2.0));
    assert_eq!(outcome.results.record_count(), 1);
    assert_eq!(outcome.stats.records_stored, 2);
    assert_eq!(outcome.stats.records_replaced, 1);
}

#[test]
fn test_unknown_extension_fails() {
    let outcome = parse_text(
        create_analyte_rows_profile(),
        create_test_catalog(),
        "scenario.txt",
        SCENARIO_CSV,
    );

    assert_eq!(outcome.status, ParseStatus::Failure);
    assert_eq!(outcome.code(), -1);
    assert_eq!(
        messages(&outcome.errors),
        vec!["scenario.txt is not an XLS, XLSX, or CSV document"]
    );
    assert!(outcome.results.is_empty());
}

#[test]
fn test_mislabeled_spreadsheet_falls_back() {
    let converter = Arc::new(FakeConverter::new().succeeds(SpreadsheetKind::Xlsx, SCENARIO_CSV));
    let parser = spreadsheet_parser(converter.clone());

    let outcome = parser.parse(&InstrumentFile::new("scenario.xls", b"PK\x03\x04".to_vec()));

    assert_eq!(outcome.status, ParseStatus::Success);
    assert_eq!(
        converter.attempts(),
        vec![SpreadsheetKind::Xls, SpreadsheetKind::Xlsx]
    );
    assert_eq!(outcome.results.get("S1", "Pb").unwrap().primary(), Some(12.5));
    // Only the row-level error of the scenario, no file-level one
    assert_eq!(outcome.errors.len(), 1);
    assert!(outcome.warnings.is_empty());
}

#[test]
fn test_detected_kind_tried_first() {
    let converter = Arc::new(FakeConverter::new().succeeds(SpreadsheetKind::Xlsx, SCENARIO_CSV));
    let parser = spreadsheet_parser(converter.clone());

    let outcome = parser.parse(&InstrumentFile::new("scenario.xlsx", Vec::new()));

    assert!(outcome.is_success());
    assert_eq!(converter.attempts(), vec![SpreadsheetKind::Xlsx]);
}

#[test]
fn test_all_conversions_fail() {
    let converter = Arc::new(FakeConverter::new());
    let parser = spreadsheet_parser(converter.clone());

    let outcome = parser.parse(&InstrumentFile::new("broken.xlsx", Vec::new()));

    assert_eq!(outcome.status, ParseStatus::Failure);
    assert!(outcome.errors.is_empty());
    assert_eq!(
        messages(&outcome.warnings),
        vec!["Can't parse input file as XLS, XLSX, or CSV."]
    );
    assert_eq!(converter.attempts().len(), 2);
}

#[test]
fn test_sheet_not_found() {
    let converter = Arc::new(
        FakeConverter::new()
            .fails(
                SpreadsheetKind::Xlsx,
                ConversionError::SheetNotFound {
                    sheet: "Results".to_string(),
                },
            )
            .fails(
                SpreadsheetKind::Xls,
                ConversionError::failed(SpreadsheetKind::Xls, "not a compound document"),
            ),
    );
    let parser = spreadsheet_parser(converter);

    let outcome = parser.parse(&InstrumentFile::new("run.xlsx", Vec::new()));

    assert_eq!(outcome.status, ParseStatus::Failure);
    assert_eq!(
        messages(&outcome.errors),
        vec!["Sheet not found in workbook: Results"]
    );
    assert_eq!(outcome.warnings.len(), 1);
}

#[test]
fn test_invalid_utf8_is_warned() {
    let parser = InstrumentParser::new(create_analyte_rows_profile(), create_test_catalog());
    let mut bytes = b"Sample Id,Analyte,Reading\nS1,Pb,12.5\nS1,Cd,1\xff\n".to_vec();
    bytes.extend_from_slice(b"S2,Pb,3\n");

    let outcome = parser.parse(&InstrumentFile::new("latin.csv", bytes));

    assert!(outcome.is_success());
    assert_eq!(outcome.warnings.len(), 1);
    assert!(outcome.warnings[0].message().contains("latin.csv"));
    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(outcome.results.get("S2", "Pb").unwrap().primary(), Some(3.0));
}

#[test]
fn test_empty_labeled_file_fails() {
    let outcome = parse_text(
        create_analyte_rows_profile(),
        create_test_catalog(),
        "empty.csv",
        "",
    );

    assert_eq!(outcome.status, ParseStatus::Failure);
    assert_eq!(outcome.errors.len(), 1);
}

#[test]
fn test_header_only_file_succeeds() {
    let outcome = parse_text(
        create_analyte_rows_profile(),
        create_test_catalog(),
        "header.csv",
        "Sample Id,Analyte,Reading\n",
    );

    assert!(outcome.is_success());
    assert!(outcome.results.is_empty());
    assert_eq!(outcome.stats.total_rows, 0);
}

#[test]
fn test_custom_delimiter() {
    let profile = create_analyte_rows_profile().with_delimiter(';');
    let outcome = parse_text(
        profile,
        create_test_catalog(),
        "semicolon.csv",
        "Sample Id;Analyte;Reading\nS1;Pb;7\n",
    );

    assert_eq!(outcome.results.get("S1", "Pb").unwrap().primary(), Some(7.0));
}

#[test]
fn test_parse_path_reads_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scenario.csv");
    std::fs::write(&path, SCENARIO_CSV).unwrap();

    let parser = InstrumentParser::new(create_analyte_rows_profile(), create_test_catalog());
    let outcome = parser.parse_path(&path).unwrap();

    assert_eq!(outcome.results.sample_count(), 2);
    assert!(parser.parse_path(&dir.path().join("missing.csv")).is_err());
}

#[test]
fn test_phase_transitions() {
    assert!(ParsePhase::Init.can_advance_to(ParsePhase::HeaderScan));
    assert!(ParsePhase::HeaderScan.can_advance_to(ParsePhase::RowProcessing));
    assert!(ParsePhase::RowProcessing.can_advance_to(ParsePhase::Done));
    assert!(ParsePhase::Init.can_advance_to(ParsePhase::Failed));
    assert!(ParsePhase::HeaderScan.can_advance_to(ParsePhase::Failed));

    assert!(!ParsePhase::RowProcessing.can_advance_to(ParsePhase::HeaderScan));
    assert!(!ParsePhase::Done.can_advance_to(ParsePhase::Failed));
    assert!(!ParsePhase::Init.can_advance_to(ParsePhase::RowProcessing));
    assert!(ParsePhase::Done.is_terminal());
    assert!(!ParsePhase::HeaderScan.is_terminal());
}
