//! Tests for format detection, decoding and header scanning

use super::*;
use crate::app::models::Keyword;
use crate::app::services::instrument_parser::decoder::{LabeledTable, decode_text};
use crate::app::services::instrument_parser::format::FormatKind;
use crate::app::services::instrument_parser::header::{DiscoveredHeader, scan_header};
use crate::app::services::instrument_parser::layouts::formula_rows::sample_id_candidates;
use crate::profiles::HeaderSentinel;

#[test]
fn test_format_detection() {
    assert_eq!(FormatKind::detect("results.csv"), FormatKind::Csv);
    assert_eq!(FormatKind::detect("RESULTS.CSV"), FormatKind::Csv);
    assert_eq!(FormatKind::detect("run.Xls"), FormatKind::Xls);
    assert_eq!(FormatKind::detect("run.xlsx"), FormatKind::Xlsx);
    assert_eq!(FormatKind::detect("notes.txt"), FormatKind::Unknown);
    assert_eq!(FormatKind::detect("no_extension"), FormatKind::Unknown);
}

#[test]
fn test_conversion_order() {
    assert_eq!(
        FormatKind::Xls.conversion_order(),
        vec![SpreadsheetKind::Xls, SpreadsheetKind::Xlsx]
    );
    assert_eq!(
        FormatKind::Xlsx.conversion_order(),
        vec![SpreadsheetKind::Xlsx, SpreadsheetKind::Xls]
    );
    assert!(FormatKind::Csv.conversion_order().is_empty());
}

#[test]
fn test_decode_strips_bom() {
    let decoded = decode_text("\u{feff}a,b\n1,2".as_bytes());
    assert_eq!(decoded.text, "a,b\n1,2");
    assert!(!decoded.lossy);
}

#[test]
fn test_decode_invalid_utf8_is_lossy() {
    let decoded = decode_text(b"a,b\n\xff,2");
    assert!(decoded.lossy);
    assert!(decoded.text.starts_with("a,b\n"));
}

#[test]
fn test_read_rows_flexible_lengths() {
    let rows = rows("a,b,c\n1\n\n2,3");

    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].len(), 3);
    assert_eq!(rows[1].len(), 1);
    assert_eq!(rows[1].cell(5), "");
    assert_eq!(rows[2].line_number(), 4);
    assert_eq!(rows[2].line(), "2,3");
}

#[test]
fn test_raw_row_trims_cells() {
    let rows = rows(" S1 , Pb ,  ");

    assert_eq!(rows[0].cell(0), "S1");
    assert_eq!(rows[0].cells_from(1), vec!["Pb", ""]);
    assert!(!rows[0].is_blank());
}

#[test]
fn test_labeled_table() {
    let table = LabeledTable::from_rows(rows("Sample Id,Analyte,Reading\nS1,Pb,12.5\nS2,Cd")).unwrap();

    assert_eq!(table.headers(), ["Sample Id", "Analyte", "Reading"]);
    assert_eq!(table.len(), 2);

    let records: Vec<_> = table.records().collect();
    assert_eq!(records[0].get("Analyte"), "Pb");
    assert_eq!(records[1].get("Reading"), "");
    assert_eq!(records[1].get("Missing"), "");
    assert!(records[0].has_column("Reading"));
    assert_eq!(records[0].raw().line_number(), 2);
}

#[test]
fn test_labeled_table_empty_input() {
    assert!(LabeledTable::from_rows(Vec::new()).is_none());
}

#[test]
fn test_scan_last_token_header() {
    let rows = rows("Method,xyz\nRun date,2024-01-01\nSample,THC,CBD,ISarea,end\nS1,1,2,3\nend");
    let sentinel = HeaderSentinel::LastToken {
        token: "end".to_string(),
    };

    let scan = scan_header(&rows, &sentinel).unwrap();
    assert_eq!(scan.header_index, 2);
    assert_eq!(
        scan.header,
        DiscoveredHeader::Columns(vec![
            "THC".to_string(),
            "CBD".to_string(),
            "ISarea".to_string()
        ])
    );
    assert_eq!(scan.data_rows(&rows).len(), 2);
}

#[test]
fn test_scan_first_token_prefix_header() {
    let rows = rows("Batch,42\nSample,,,,,,,Benzene Results,\n,,Name,,,,Acq,RT\n,,S1,,,,d,1.2");
    let sentinel = HeaderSentinel::FirstTokenPrefix {
        prefix: "Sample".to_string(),
        keyword_column: 7,
    };

    let scan = scan_header(&rows, &sentinel).unwrap();
    assert_eq!(scan.header_index, 1);
    assert_eq!(
        scan.header,
        DiscoveredHeader::Analyte(Keyword::normalize("Benzene"))
    );
}

#[test]
fn test_scan_header_missing() {
    let rows = rows("a,b\n1,2");
    let sentinel = HeaderSentinel::LastToken {
        token: "end".to_string(),
    };
    assert!(scan_header(&rows, &sentinel).is_none());
}

#[test]
fn test_sample_id_candidates() {
    assert_eq!(
        sample_id_candidates("WS-0012-3.csv"),
        vec!["WS-0012-3".to_string(), "WS-0012".to_string()]
    );
    assert_eq!(sample_id_candidates("S1.csv"), vec!["S1".to_string()]);
}
