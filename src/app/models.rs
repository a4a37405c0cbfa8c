//! Data models for instrument result processing
//!
//! This module contains the core data structures produced by a parse pass:
//! analysis keywords, canonical result fields, result records keyed by
//! sample and keyword, and the overall parse status.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::constants::{STATUS_FAILURE, STATUS_SUCCESS};

pub mod diagnostics;

pub use diagnostics::{Diagnostic, Severity};

// =============================================================================
// Keywords and Identifiers
// =============================================================================

/// Normalized analysis keyword
///
/// Keywords contain only word characters (alphanumerics and `_`) with case
/// preserved. They are derived from header labels or data cells, which
/// frequently carry spaces, punctuation or unit decorations around the
/// actual analysis identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Keyword(String);

impl Keyword {
    /// Derive a keyword by stripping every character that is not alphanumeric or `_`
    pub fn normalize(raw: &str) -> Self {
        Self(raw.chars().filter(|c| c.is_alphanumeric() || *c == '_').collect())
    }

    /// Derive a keyword from an identifier cell, keeping `-` as well
    pub fn identifier(raw: &str) -> Self {
        Self(normalize_identifier(raw))
    }

    /// The keyword text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when normalization left nothing behind
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Keyword {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Normalize an identifier cell, keeping letters, digits, hyphen and underscore
///
/// Used for sample identifiers and for formula cells that double as keywords.
pub fn normalize_identifier(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '_')
        .collect()
}

// =============================================================================
// Canonical Result Fields
// =============================================================================

/// Canonical name of a field inside a result record
///
/// Instrument column labels are mapped onto these names. Fields that only
/// exist as analysis interim fields in the LIMS are carried as [`Interim`].
///
/// [`Interim`]: CanonicalField::Interim
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum CanonicalField {
    Reading,
    ReadingPct,
    ReadingPpm,
    Result,
    ResultValue,
    Formula,
    Z,
    Status,
    Line1,
    NetInt,
    Lld,
    StatError,
    AnalyzedLayer,
    BoundPct,
    ReturnTime,
    Resp,
    CalcConc,
    FinalConc,
    Accuracy,
    Ratio,
    Mi,
    DateTime,
    Remarks,
    /// Analysis interim field named by its LIMS keyword
    Interim(String),
}

impl CanonicalField {
    /// Field name as submitted to the importer
    pub fn as_str(&self) -> &str {
        match self {
            Self::Reading => "reading",
            Self::ReadingPct => "reading_pct",
            Self::ReadingPpm => "reading_ppm",
            Self::Result => "result",
            Self::ResultValue => "resultValue",
            Self::Formula => "formula",
            Self::Z => "z",
            Self::Status => "status",
            Self::Line1 => "line_1",
            Self::NetInt => "net_int",
            Self::Lld => "lld",
            Self::StatError => "stat_error",
            Self::AnalyzedLayer => "analyzed_layer",
            Self::BoundPct => "bound_pct",
            Self::ReturnTime => "ReturnTime",
            Self::Resp => "Resp",
            Self::CalcConc => "CalcConc",
            Self::FinalConc => "FinalConc",
            Self::Accuracy => "Accuracy",
            Self::Ratio => "Ratio",
            Self::Mi => "MI",
            Self::DateTime => "DateTime",
            Self::Remarks => "Remarks",
            Self::Interim(name) => name,
        }
    }

    /// Field for an interim keyword; known canonical names map to their variant
    pub fn interim(keyword: &str) -> Self {
        Self::from(keyword.to_string())
    }
}

impl FromStr for CanonicalField {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "reading" => Self::Reading,
            "reading_pct" => Self::ReadingPct,
            "reading_ppm" => Self::ReadingPpm,
            "result" => Self::Result,
            "resultValue" => Self::ResultValue,
            "formula" => Self::Formula,
            "z" => Self::Z,
            "status" => Self::Status,
            "line_1" => Self::Line1,
            "net_int" => Self::NetInt,
            "lld" => Self::Lld,
            "stat_error" => Self::StatError,
            "analyzed_layer" => Self::AnalyzedLayer,
            "bound_pct" => Self::BoundPct,
            "ReturnTime" => Self::ReturnTime,
            "Resp" => Self::Resp,
            "CalcConc" => Self::CalcConc,
            "FinalConc" => Self::FinalConc,
            "Accuracy" => Self::Accuracy,
            "Ratio" => Self::Ratio,
            "MI" => Self::Mi,
            "DateTime" => Self::DateTime,
            "Remarks" => Self::Remarks,
            other => Self::Interim(other.to_string()),
        })
    }
}

impl From<String> for CanonicalField {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(field) => field,
            Err(never) => match never {},
        }
    }
}

impl From<CanonicalField> for String {
    fn from(field: CanonicalField) -> Self {
        field.as_str().to_string()
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Result Records
// =============================================================================

/// Value stored under a result field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
    Null,
}

impl FieldValue {
    /// Numeric value satisfying the record invariant
    ///
    /// Negative values clamp to zero and non-finite values become `Null`.
    pub fn number(value: f64) -> Self {
        if value.is_finite() {
            Self::Number(value.max(0.0))
        } else {
            Self::Null
        }
    }

    /// Get the numeric value, if any
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }

    /// Get the text value, if any
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }
}

/// Result record for one (sample, analysis keyword) pair
///
/// Serialized as a flat map of field name to value plus a `DefaultResult`
/// entry naming the field that holds the primary result. `DefaultResult` is
/// `null` for records that only carry interim values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultRecord {
    fields: BTreeMap<CanonicalField, FieldValue>,
    default_result: Option<CanonicalField>,
}

impl ResultRecord {
    /// Create an empty record with the given primary result field
    pub fn new(default_result: Option<CanonicalField>) -> Self {
        Self {
            fields: BTreeMap::new(),
            default_result,
        }
    }

    /// Create a record holding a single primary numeric result
    pub fn with_primary(field: CanonicalField, value: f64) -> Self {
        let mut record = Self::new(Some(field.clone()));
        record.set_number(field, value);
        record
    }

    /// Store a numeric field, clamping to the record invariant
    pub fn set_number(&mut self, field: CanonicalField, value: f64) {
        self.fields.insert(field, FieldValue::number(value));
    }

    /// Store a text field
    pub fn set_text(&mut self, field: CanonicalField, value: impl Into<String>) {
        self.fields.insert(field, FieldValue::Text(value.into()));
    }

    /// Merge another record's fields into this one
    ///
    /// Fields of `other` overwrite fields of the same name. The primary
    /// result designation is kept unless this record has none.
    pub fn merge(&mut self, other: ResultRecord) {
        self.fields.extend(other.fields);
        if self.default_result.is_none() {
            self.default_result = other.default_result;
        }
    }

    /// Field holding the primary result
    pub fn default_result(&self) -> Option<&CanonicalField> {
        self.default_result.as_ref()
    }

    /// Get a field value
    pub fn get(&self, field: &CanonicalField) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    /// Get a numeric field value
    pub fn number(&self, field: &CanonicalField) -> Option<f64> {
        self.get(field).and_then(FieldValue::as_f64)
    }

    /// Get the primary numeric result
    pub fn primary(&self) -> Option<f64> {
        self.default_result
            .as_ref()
            .and_then(|field| self.number(field))
    }

    /// Check whether a field is present
    pub fn contains(&self, field: &CanonicalField) -> bool {
        self.fields.contains_key(field)
    }

    /// Iterate fields in canonical order
    pub fn fields(&self) -> impl Iterator<Item = (&CanonicalField, &FieldValue)> {
        self.fields.iter()
    }

    /// Number of stored fields (excluding `DefaultResult`)
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when no field is stored
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for ResultRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 1))?;
        for (field, value) in &self.fields {
            map.serialize_entry(field.as_str(), value)?;
        }
        map.serialize_entry(
            "DefaultResult",
            &self.default_result.as_ref().map(CanonicalField::as_str),
        )?;
        map.end()
    }
}

/// Records for one sample, keyed by analysis keyword
pub type SampleResults = BTreeMap<String, ResultRecord>;

/// Results of a parse pass: sample identifier → analysis keyword → record
///
/// Ordered maps keep the output deterministic across passes.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct ResultSet {
    samples: BTreeMap<String, SampleResults>,
}

impl ResultSet {
    /// Create an empty result set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, returning the record it replaced
    pub fn insert(
        &mut self,
        sample_id: &str,
        keyword: &str,
        record: ResultRecord,
    ) -> Option<ResultRecord> {
        self.samples
            .entry(sample_id.to_string())
            .or_default()
            .insert(keyword.to_string(), record)
    }

    /// Register a sample so it appears in the output even without records
    pub fn ensure_sample(&mut self, sample_id: &str) {
        self.samples.entry(sample_id.to_string()).or_default();
    }

    /// Get the record for a (sample, keyword) pair
    pub fn get(&self, sample_id: &str, keyword: &str) -> Option<&ResultRecord> {
        self.samples
            .get(sample_id)
            .and_then(|records| records.get(keyword))
    }

    /// Get every record of a sample
    pub fn sample(&self, sample_id: &str) -> Option<&SampleResults> {
        self.samples.get(sample_id)
    }

    /// Iterate samples in identifier order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &SampleResults)> {
        self.samples.iter()
    }

    /// Number of samples present
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Total number of records across all samples
    pub fn record_count(&self) -> usize {
        self.samples.values().map(BTreeMap::len).sum()
    }

    /// True when no sample is present
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

// =============================================================================
// Parse Status
// =============================================================================

/// Overall outcome of a parse pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseStatus {
    /// At least part of the file was processed
    Success,
    /// The file was rejected outright
    Failure,
}

impl ParseStatus {
    /// Numeric status code handed to the host importer
    pub fn code(self) -> i32 {
        match self {
            Self::Success => STATUS_SUCCESS,
            Self::Failure => STATUS_FAILURE,
        }
    }

    pub fn is_success(self) -> bool {
        self == Self::Success
    }
}

impl fmt::Display for ParseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Failure => write!(f, "failure"),
        }
    }
}
