//! In-memory sample catalog loaded from a JSON snapshot
//!
//! The snapshot lists samples and reference groups with their analyses:
//!
//! ```json
//! {
//!   "samples": [
//!     {"id": "S1", "analyses": [{"keyword": "Pb"}, {"keyword": "Cd"}]}
//!   ],
//!   "reference_groups": [
//!     {"id": "QC-1", "analyses": [{"keyword": "Pb"}]}
//!   ]
//! }
//! ```

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use super::{AnalysisRef, SampleCatalog, SampleRef};
use crate::{Error, Result};

/// Catalog snapshot file layout
#[derive(Debug, Default, Deserialize)]
struct CatalogSnapshot {
    #[serde(default)]
    samples: Vec<SampleRef>,
    #[serde(default)]
    reference_groups: Vec<SampleRef>,
}

/// Sample catalog held in memory, indexed by identifier
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    samples: HashMap<String, Arc<SampleRef>>,
    reference_groups: HashMap<String, Arc<SampleRef>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style sample registration
    pub fn with_sample(mut self, id: &str, analyses: Vec<AnalysisRef>) -> Self {
        self.add_sample(SampleRef::new(id, analyses));
        self
    }

    /// Builder-style reference group registration
    pub fn with_reference_group(mut self, id: &str, analyses: Vec<AnalysisRef>) -> Self {
        self.add_reference_group(SampleRef::new(id, analyses));
        self
    }

    /// Register a sample, replacing any sample with the same identifier
    pub fn add_sample(&mut self, sample: SampleRef) {
        self.samples
            .insert(sample.id().to_string(), Arc::new(sample));
    }

    /// Register a reference group, replacing any group with the same identifier
    pub fn add_reference_group(&mut self, group: SampleRef) {
        self.reference_groups
            .insert(group.id().to_string(), Arc::new(group));
    }

    /// Parse a catalog snapshot from JSON text
    pub fn from_json_str(json: &str) -> Result<Self> {
        let snapshot: CatalogSnapshot = serde_json::from_str(json)
            .map_err(|e| Error::catalog(format!("Invalid catalog snapshot: {}", e)))?;

        let mut catalog = Self::new();
        for sample in snapshot.samples {
            catalog.add_sample(sample);
        }
        for group in snapshot.reference_groups {
            catalog.add_reference_group(group);
        }

        debug!(
            "Catalog snapshot holds {} samples and {} reference groups",
            catalog.sample_count(),
            catalog.reference_group_count()
        );
        Ok(catalog)
    }

    /// Load a catalog snapshot from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        info!("Loading sample catalog: {}", path.display());
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::io(format!("Failed to read catalog {}", path.display()), e)
        })?;
        Self::from_json_str(&content)
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    pub fn reference_group_count(&self) -> usize {
        self.reference_groups.len()
    }
}

impl SampleCatalog for InMemoryCatalog {
    fn find_sample(&self, id: &str) -> Option<Arc<SampleRef>> {
        self.samples.get(id).cloned()
    }

    fn find_reference_group(&self, id: &str) -> Option<Arc<SampleRef>> {
        self.reference_groups.get(id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SNAPSHOT: &str = r#"{
        "samples": [
            {"id": "S1", "analyses": [{"keyword": "Pb"}, {"keyword": "Cd", "interims": ["dil"]}]},
            {"id": "S2"}
        ],
        "reference_groups": [
            {"id": "QC-1", "analyses": [{"keyword": "Pb"}]}
        ]
    }"#;

    #[test]
    fn test_from_json_str() {
        let catalog = InMemoryCatalog::from_json_str(SNAPSHOT).unwrap();
        assert_eq!(catalog.sample_count(), 2);
        assert_eq!(catalog.reference_group_count(), 1);

        let s1 = catalog.find_sample("S1").unwrap();
        assert_eq!(s1.analyses().len(), 2);
        assert!(s1.analyses()[1].has_interim("dil"));
        assert!(catalog.find_sample("S2").unwrap().analyses().is_empty());
        assert!(catalog.find_sample("QC-1").is_none());
        assert_eq!(catalog.find_reference_group("QC-1").unwrap().id(), "QC-1");
    }

    #[test]
    fn test_invalid_snapshot() {
        let result = InMemoryCatalog::from_json_str("{\"samples\": 3}");
        assert!(matches!(result, Err(Error::Catalog { .. })));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SNAPSHOT.as_bytes()).unwrap();

        let catalog = InMemoryCatalog::load(file.path()).unwrap();
        assert!(catalog.find_sample("S1").is_some());
    }

    #[test]
    fn test_builder_registration() {
        let catalog = InMemoryCatalog::new()
            .with_sample("S1", vec![AnalysisRef::new("Pb")])
            .with_reference_group("RG", vec![AnalysisRef::new("Cd")]);
        assert_eq!(catalog.find_sample("S1").unwrap().analyses()[0].keyword(), "Pb");
        assert!(catalog.find_reference_group("S1").is_none());
    }
}
