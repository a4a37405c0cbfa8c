//! Per-pass result accumulation
//!
//! Holds at most one record per (sample, keyword). A later record for the
//! same pair replaces the earlier one; replacements are counted so the
//! policy stays auditable.

use tracing::debug;

use crate::app::models::{ResultRecord, ResultSet};

#[derive(Debug, Clone, Default)]
pub struct ResultAccumulator {
    results: ResultSet,
    stored: usize,
    replaced: usize,
}

impl ResultAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the record for (sample, keyword)
    pub fn add(&mut self, sample_id: &str, keyword: &str, record: ResultRecord) {
        self.stored += 1;
        if self.results.insert(sample_id, keyword, record).is_some() {
            self.replaced += 1;
            debug!("Replaced earlier record for {}/{}", sample_id, keyword);
        }
    }

    /// Make the sample visible in the results even if no record follows
    pub fn ensure_sample(&mut self, sample_id: &str) {
        self.results.ensure_sample(sample_id);
    }

    /// Records inserted so far, replacements included
    pub fn stored(&self) -> usize {
        self.stored
    }

    pub fn replaced(&self) -> usize {
        self.replaced
    }

    pub fn results(&self) -> &ResultSet {
        &self.results
    }

    pub fn into_results(self) -> ResultSet {
        self.results
    }
}
