//! Application constants for the instrument results importer
//!
//! This module contains sentinel values, unit factors, status codes and
//! defaults used throughout the parsing engine and CLI.

// =============================================================================
// Parse Status Codes
// =============================================================================

/// Status code returned when at least part of the file was processed
pub const STATUS_SUCCESS: i32 = 0;

/// Status code returned when the file was rejected outright
pub const STATUS_FAILURE: i32 = -1;

// =============================================================================
// File Formats
// =============================================================================

/// Extension of delimited text files (compared case-insensitively)
pub const CSV_EXTENSION: &str = "csv";

/// Extension of legacy binary workbooks
pub const XLS_EXTENSION: &str = "xls";

/// Extension of Office Open XML workbooks
pub const XLSX_EXTENSION: &str = "xlsx";

/// Default field delimiter for delimited text
pub const DEFAULT_DELIMITER: u8 = b',';

/// Default worksheet index when no sheet selector is configured
pub const DEFAULT_SHEET_INDEX: usize = 0;

/// UTF-8 byte order mark some vendor exports prepend
pub const UTF8_BOM: &str = "\u{feff}";

// =============================================================================
// Result Coercion
// =============================================================================

/// Prefix marking a "no result" cell that coerces to zero
pub const ZERO_SENTINEL_PREFIX: &str = "--";

/// Exact cell values that coerce to zero ("not detected")
pub const ZERO_SENTINEL_VALUES: &[&str] = &["", "ND"];

/// Percent units per ppm unit
pub const PERCENT_PER_PPM: f64 = 1e-4;

/// Marker identifying a ppm reading (compared case-insensitively)
pub const PPM_MARKER: &str = "ppm";

/// Marker identifying a percent reading
pub const PERCENT_MARKER: &str = "%";

// =============================================================================
// Instrument Layout Defaults
// =============================================================================

/// Row markers in analyte-column exports that never name a sample
pub const NON_SAMPLE_ROW_MARKERS: &[&str] = &["sample id", "blk", "rblk", "calibration curves"];

/// Header labels in analyte-column exports that carry metadata, not results
pub const NON_ANALYTE_HEADERS: &[&str] = &[
    "Sample Id",
    "R",
    "Acquisition Time",
    "QC Status",
    "Dataset File",
    "Method File",
];

/// Closing token of a keyword header line and of the data section
pub const KEYWORD_HEADER_END_TOKEN: &str = "end";

/// Prefix of the sentinel header line in quantitation exports
pub const QUANTITATION_HEADER_PREFIX: &str = "Sample";

/// Label marking the column-name line inside quantitation data
pub const QUANTITATION_NAME_LABEL: &str = "Name";

// =============================================================================
// Runtime Defaults
// =============================================================================

/// Default number of files parsed concurrently by the CLI
pub const DEFAULT_PARALLEL_WORKERS: usize = 4;

/// Prefix for environment variable configuration overrides
pub const ENV_PREFIX: &str = "INSTRUMENT_RESULTS_";

/// Application directory name under the user config directory
pub const CONFIG_DIR_NAME: &str = "instrument-results";

/// Configuration file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_are_distinct() {
        assert_eq!(STATUS_SUCCESS, 0);
        assert_eq!(STATUS_FAILURE, -1);
    }

    #[test]
    fn test_zero_sentinels() {
        assert!(ZERO_SENTINEL_VALUES.contains(&""));
        assert!(ZERO_SENTINEL_VALUES.contains(&"ND"));
        assert!(!ZERO_SENTINEL_VALUES.contains(&"nd"));
    }

    #[test]
    fn test_unit_factor() {
        assert!((100.0 * PERCENT_PER_PPM - 0.01).abs() < 1e-12);
    }
}
