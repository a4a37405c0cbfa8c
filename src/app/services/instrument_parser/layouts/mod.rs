//! Row semantics of the supported instrument layouts
//!
//! Every layout walks decoded rows and routes each cell through the shared
//! components held by [`PassContext`]: sample lookup, keyword resolution,
//! result coercion and accumulation. Row-level problems become diagnostics
//! and never end the pass; only [`PassEnd::Rejected`] does.

pub mod analyte_columns;
pub mod analyte_rows;
pub mod fixed_columns;
pub mod formula_rows;
pub mod keyword_columns;

use std::sync::Arc;

use super::accumulator::ResultAccumulator;
use super::coercion::ResultCoercer;
use super::decoder::RawRow;
use super::diagnostics::DiagnosticsSink;
use super::keyword_resolver::{KeywordResolver, Resolution};
use super::stats::ParseStats;
use crate::app::models::Keyword;
use crate::app::services::catalog::{SampleCatalog, SampleRef};
use crate::profiles::InstrumentProfile;

/// How the row-processing phase ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassEnd {
    /// All rows were visited
    Completed,
    /// The file was rejected as a whole
    Rejected,
}

/// Mutable state and collaborators of one parse pass
pub struct PassContext<'a> {
    pub filename: &'a str,
    pub profile: &'a InstrumentProfile,
    pub catalog: &'a dyn SampleCatalog,
    pub resolver: KeywordResolver,
    pub diagnostics: DiagnosticsSink,
    pub results: ResultAccumulator,
    pub stats: ParseStats,
}

impl<'a> PassContext<'a> {
    pub fn new(
        filename: &'a str,
        profile: &'a InstrumentProfile,
        catalog: &'a dyn SampleCatalog,
    ) -> Self {
        Self {
            filename,
            profile,
            catalog,
            resolver: KeywordResolver::new(profile.interim_fallback),
            diagnostics: DiagnosticsSink::new(),
            results: ResultAccumulator::new(),
            stats: ParseStats::new(),
        }
    }

    pub fn coercer(&self) -> ResultCoercer<'a> {
        ResultCoercer::new(&self.profile.coercion)
    }

    /// Look up a sample, warning when it is unknown
    ///
    /// A found sample is registered in the results so it is reported even
    /// when none of its rows store a record.
    pub fn find_sample(&mut self, sample_id: &str, row: &RawRow) -> Option<Arc<SampleRef>> {
        match self.catalog.find_sample(sample_id) {
            Some(sample) => {
                self.results.ensure_sample(sample_id);
                Some(sample)
            }
            None => {
                self.sample_not_found(sample_id, row);
                None
            }
        }
    }

    pub fn sample_not_found(&mut self, sample_id: &str, row: &RawRow) {
        self.diagnostics
            .warn("Sample not found for ${sid}")
            .with("sid", sample_id)
            .at(row);
    }

    /// Resolve a raw candidate cell to an analysis keyword, reporting misses
    pub fn resolve_keyword(
        &mut self,
        sample: &SampleRef,
        candidate: &str,
        row: &RawRow,
    ) -> Option<String> {
        self.resolve(sample, &Keyword::normalize(candidate), row)
    }

    /// Resolve an already normalized keyword
    ///
    /// NotFound is informational (many columns are metadata); Ambiguous is
    /// a warning and the cell is skipped. Empty keywords are skipped
    /// without a diagnostic.
    pub fn resolve(
        &mut self,
        sample: &SampleRef,
        keyword: &Keyword,
        row: &RawRow,
    ) -> Option<String> {
        if keyword.is_empty() {
            return None;
        }
        match self.resolver.resolve(sample, keyword) {
            Resolution::Unique(analysis) => Some(analysis.keyword().to_string()),
            Resolution::NotFound => {
                self.keyword_not_found(keyword, row);
                None
            }
            Resolution::Ambiguous(count) => {
                self.keyword_ambiguous(keyword, count, row);
                None
            }
        }
    }

    pub fn keyword_not_found(&mut self, keyword: &Keyword, row: &RawRow) {
        self.diagnostics
            .log("No analysis found matching Keyword '${kw}'")
            .with("kw", keyword)
            .at(row);
    }

    pub fn keyword_ambiguous(&mut self, keyword: &Keyword, count: usize, row: &RawRow) {
        self.diagnostics
            .warn("Multiple analyses found matching Keyword \"${kw}\"")
            .with("kw", keyword)
            .with("count", count)
            .at(row);
    }

    /// Coerce a cell, recording an error when it is not numeric
    pub fn coerce(&mut self, column_name: &str, raw: &str, row: &RawRow) -> Option<f64> {
        let value = self.coercer().coerce(raw);
        if value.is_none() {
            self.stats.fields_rejected += 1;
            self.diagnostics
                .error("No valid number ${result} in column (${column_name})")
                .with("result", raw)
                .with("column_name", column_name)
                .at(row);
        }
        value
    }

    /// Fold accumulator counters into the statistics
    pub fn finish(mut self) -> (ResultAccumulator, DiagnosticsSink, ParseStats) {
        self.stats.records_stored = self.results.stored();
        self.stats.records_replaced = self.results.replaced();
        (self.results, self.diagnostics, self.stats)
    }
}
