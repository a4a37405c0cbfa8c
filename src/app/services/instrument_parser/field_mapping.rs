//! Instrument column label mapping
//!
//! A label is either a known field from the instrument's static table, a
//! metadata column to ignore, or (when neither) a candidate analysis keyword.
//! Some instruments name result columns after compound formulas, which is
//! why unknown labels double as keyword candidates.

use std::collections::BTreeMap;

use crate::app::models::{CanonicalField, normalize_identifier};

/// Outcome of mapping one column label
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappedField {
    /// Label found in the static field table
    Known(CanonicalField),

    /// Label names a metadata column
    Metadata,

    /// Unrecognized label, normalized for keyword resolution
    Candidate(String),
}

/// Maps instrument column labels for one profile
#[derive(Debug, Clone, Default)]
pub struct FieldMapper<'a> {
    table: Option<&'a BTreeMap<String, CanonicalField>>,
    metadata: &'a [String],
}

impl<'a> FieldMapper<'a> {
    /// Mapper backed by a static label table (exact, case-sensitive keys)
    pub fn new(table: &'a BTreeMap<String, CanonicalField>) -> Self {
        Self {
            table: Some(table),
            metadata: &[],
        }
    }

    /// Mapper without a table where only metadata columns are excluded
    pub fn with_metadata(metadata: &'a [String]) -> Self {
        Self {
            table: None,
            metadata,
        }
    }

    pub fn map_field(&self, raw_label: &str) -> MappedField {
        if let Some(field) = self.table.and_then(|table| table.get(raw_label)) {
            return MappedField::Known(field.clone());
        }
        if self.metadata.iter().any(|label| label == raw_label) {
            return MappedField::Metadata;
        }
        MappedField::Candidate(normalize_identifier(raw_label))
    }

    /// Map every label of a row, keeping only known fields
    pub fn known_fields<'r, I>(&self, pairs: I) -> BTreeMap<CanonicalField, &'r str>
    where
        I: IntoIterator<Item = (&'r str, &'r str)>,
    {
        pairs
            .into_iter()
            .filter_map(|(label, value)| match self.map_field(label) {
                MappedField::Known(field) => Some((field, value)),
                _ => None,
            })
            .collect()
    }
}
