//! Parsing statistics for instrument result files
//!
//! Counters are collected per parse pass and reported alongside the results.

use serde::{Deserialize, Serialize};

/// Simple parsing statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseStats {
    /// Data rows encountered (after the header)
    pub total_rows: usize,

    /// Rows that stored at least one record
    pub rows_processed: usize,

    /// Rows that stored nothing
    pub rows_skipped: usize,

    /// Records inserted into the result set
    pub records_stored: usize,

    /// Inserts that replaced an earlier record for the same sample and keyword
    pub records_replaced: usize,

    /// Cells rejected by result coercion
    pub fields_rejected: usize,
}

impl ParseStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of one data row
    pub fn record_row(&mut self, records_stored: usize) {
        self.total_rows += 1;
        if records_stored > 0 {
            self.rows_processed += 1;
        } else {
            self.rows_skipped += 1;
        }
    }

    /// Calculate success rate as a percentage of data rows
    pub fn success_rate(&self) -> f64 {
        if self.total_rows == 0 {
            0.0
        } else {
            (self.rows_processed as f64 / self.total_rows as f64) * 100.0
        }
    }
}
