//! Sample catalog capability
//!
//! The parsing engine never searches the LIMS itself. It is handed a
//! read-only [`SampleCatalog`] that answers two questions: which sample (or
//! reference group) carries a given identifier, and which analyses that
//! record owns. Handles returned by the catalog are opaque to the engine.

pub mod memory;

pub use memory::InMemoryCatalog;

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Read-only lookup of samples and reference groups by identifier
pub trait SampleCatalog: Send + Sync {
    /// Find a sample by its identifier
    fn find_sample(&self, id: &str) -> Option<Arc<SampleRef>>;

    /// Find a reference (QC) group by its identifier
    fn find_reference_group(&self, id: &str) -> Option<Arc<SampleRef>>;
}

/// Handle to a sample or reference record and the analyses it owns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleRef {
    id: String,
    #[serde(default)]
    analyses: Vec<AnalysisRef>,
}

impl SampleRef {
    pub fn new(id: impl Into<String>, analyses: Vec<AnalysisRef>) -> Self {
        Self {
            id: id.into(),
            analyses,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn analyses(&self) -> &[AnalysisRef] {
        &self.analyses
    }
}

/// Handle to an analysis: its keyword and interim-field keywords
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRef {
    keyword: String,
    #[serde(default)]
    interims: Vec<String>,
}

impl AnalysisRef {
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            interims: Vec::new(),
        }
    }

    /// Attach interim-field keywords
    pub fn with_interims<I, S>(mut self, interims: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.interims = interims.into_iter().map(Into::into).collect();
        self
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn interim_keywords(&self) -> &[String] {
        &self.interims
    }

    /// True when the analysis owns an interim field with this exact keyword
    pub fn has_interim(&self, keyword: &str) -> bool {
        self.interims.iter().any(|interim| interim == keyword)
    }
}
