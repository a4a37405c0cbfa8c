//! Hand-off of parse results to the host importer
//!
//! The engine only produces normalized results. Writing them onto analysis
//! records (state checks, override policy) belongs to the host, reached
//! through the [`ResultSink`] trait. [`ImportReport`] is the JSON document
//! surfaced to users for one parsed file.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::app::models::{Diagnostic, ParseStatus, ResultSet, SampleResults};
use crate::app::services::instrument_parser::{ParseOutcome, ParseStats};
use crate::{Error, Result};

/// Receiver of per-sample results
pub trait ResultSink {
    fn submit(&mut self, sample_id: &str, records: &SampleResults) -> Result<()>;
}

/// Sink keeping every submission in memory
#[derive(Debug, Clone, Default)]
pub struct CollectingSink {
    submissions: Vec<(String, SampleResults)>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Submissions in the order they were received
    pub fn submissions(&self) -> &[(String, SampleResults)] {
        &self.submissions
    }

    pub fn len(&self) -> usize {
        self.submissions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.submissions.is_empty()
    }
}

impl ResultSink for CollectingSink {
    fn submit(&mut self, sample_id: &str, records: &SampleResults) -> Result<()> {
        self.submissions
            .push((sample_id.to_string(), records.clone()));
        Ok(())
    }
}

/// Submit every sample of a result set in identifier order
///
/// Stops at the first sink failure; returns the number of samples submitted.
pub fn submit_results(results: &ResultSet, sink: &mut dyn ResultSink) -> Result<usize> {
    let mut submitted = 0;
    for (sample_id, records) in results.iter() {
        sink.submit(sample_id, records).map_err(|e| {
            if matches!(e, Error::Submission { .. }) {
                e
            } else {
                Error::submission(sample_id.as_str(), e.to_string())
            }
        })?;
        debug!("Submitted {} records for {}", records.len(), sample_id);
        submitted += 1;
    }
    Ok(submitted)
}

/// User-facing report for one parsed file
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub file: String,
    pub profile: String,
    pub status: ParseStatus,
    pub generated_at: DateTime<Utc>,
    pub results: ResultSet,
    pub errors: Vec<String>,
    pub warns: Vec<String>,
    pub log: Vec<String>,
    pub stats: ParseStats,
}

impl ImportReport {
    /// Build a report from a parse outcome, rendering diagnostics as text
    pub fn from_outcome(
        file: impl Into<String>,
        profile: impl Into<String>,
        outcome: ParseOutcome,
    ) -> Self {
        Self {
            file: file.into(),
            profile: profile.into(),
            status: outcome.status,
            generated_at: Utc::now(),
            results: outcome.results,
            errors: render(&outcome.errors),
            warns: render(&outcome.warnings),
            log: render(&outcome.logs),
            stats: outcome.stats,
        }
    }

    /// Report for a file that could not even be read
    pub fn unreadable(file: impl Into<String>, profile: impl Into<String>, error: &Error) -> Self {
        Self {
            file: file.into(),
            profile: profile.into(),
            status: ParseStatus::Failure,
            generated_at: Utc::now(),
            results: ResultSet::new(),
            errors: vec![error.to_string()],
            warns: Vec::new(),
            log: Vec::new(),
            stats: ParseStats::default(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Records per sample, for summaries
    pub fn records_per_sample(&self) -> BTreeMap<&str, usize> {
        self.results
            .iter()
            .map(|(sample_id, records)| (sample_id.as_str(), records.len()))
            .collect()
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            Error::serialization(format!("Failed to serialize report for {}", self.file), e)
        })
    }
}

fn render(diagnostics: &[Diagnostic]) -> Vec<String> {
    diagnostics.iter().map(ToString::to_string).collect()
}
