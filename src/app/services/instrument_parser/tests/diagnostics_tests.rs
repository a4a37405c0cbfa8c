//! Tests for diagnostics collection

use super::*;
use crate::app::models::Severity;
use crate::app::services::instrument_parser::DiagnosticsSink;

#[test]
fn test_entries_go_to_their_lists() {
    let mut sink = DiagnosticsSink::new();

    sink.error("first error");
    sink.warn("a warning");
    sink.log("a log entry");
    sink.error("second error");

    assert_eq!(messages(sink.errors()), vec!["first error", "second error"]);
    assert_eq!(messages(sink.warnings()), vec!["a warning"]);
    assert_eq!(messages(sink.logs()), vec!["a log entry"]);
    assert_eq!(sink.errors()[0].severity, Severity::Error);
    assert_eq!(sink.logs()[0].severity, Severity::Log);
}

#[test]
fn test_entry_interpolation_and_line_context() {
    let rows = rows("Sample Id,Reading\nS1,abc");
    let mut sink = DiagnosticsSink::new();

    sink.error("No valid number ${result} in column (${column_name})")
        .with("result", "abc")
        .with("column_name", "reading")
        .at(&rows[1]);

    let diagnostic = &sink.errors()[0];
    assert_eq!(diagnostic.message(), "No valid number abc in column (reading)");
    assert_eq!(diagnostic.line_number, Some(2));
    assert_eq!(diagnostic.line.as_deref(), Some("S1,abc"));
    assert_eq!(
        diagnostic.to_string(),
        "line 2: No valid number abc in column (reading)"
    );
}

#[test]
fn test_into_parts_preserves_order() {
    let mut sink = DiagnosticsSink::new();
    for index in 0..3 {
        sink.warn("warning ${n}").with("n", index);
    }

    let (errors, warnings, logs) = sink.into_parts();
    assert!(errors.is_empty());
    assert!(logs.is_empty());
    assert_eq!(messages(&warnings), vec!["warning 0", "warning 1", "warning 2"]);
}
