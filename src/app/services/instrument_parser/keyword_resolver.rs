//! Keyword resolution against a sample's analyses
//!
//! Instrument keywords are frequently truncated or carry suffixes, so a
//! candidate matches every analysis whose keyword starts with it. Resolution
//! is an explicit outcome; callers decide how to report each case.

use crate::app::models::Keyword;
use crate::app::services::catalog::{AnalysisRef, SampleRef};

/// Outcome of a top-level keyword lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    Unique(&'a AnalysisRef),
    NotFound,
    /// More than one analysis matched; carries the match count
    Ambiguous(usize),
}

/// Resolves candidate keywords, optionally falling back to interim fields
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordResolver {
    interim_fallback: bool,
}

impl KeywordResolver {
    pub fn new(interim_fallback: bool) -> Self {
        Self { interim_fallback }
    }

    pub fn interim_fallback(&self) -> bool {
        self.interim_fallback
    }

    /// Prefix-match the candidate against the sample's analysis keywords
    ///
    /// An empty candidate never matches.
    pub fn resolve<'a>(&self, sample: &'a SampleRef, candidate: &Keyword) -> Resolution<'a> {
        if candidate.is_empty() {
            return Resolution::NotFound;
        }

        let mut matches = sample
            .analyses()
            .iter()
            .filter(|analysis| analysis.keyword().starts_with(candidate.as_str()));

        match (matches.next(), matches.count()) {
            (None, _) => Resolution::NotFound,
            (Some(analysis), 0) => Resolution::Unique(analysis),
            (Some(_), others) => Resolution::Ambiguous(others + 1),
        }
    }

    /// Find the first analysis owning an interim field with this exact keyword
    ///
    /// Only consulted after [`resolve`](Self::resolve) returned `NotFound`;
    /// always `None` when the fallback is disabled.
    pub fn resolve_interim<'a>(
        &self,
        sample: &'a SampleRef,
        candidate: &Keyword,
    ) -> Option<&'a AnalysisRef> {
        if !self.interim_fallback || candidate.is_empty() {
            return None;
        }
        sample
            .analyses()
            .iter()
            .find(|analysis| analysis.has_interim(candidate.as_str()))
    }
}
