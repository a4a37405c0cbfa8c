//! Instrument profiles
//!
//! A profile is the configuration object that parameterizes the generic
//! parsing engine for one instrument: delimiter, worksheet, coercion rules,
//! optional unit disambiguation, interim-field fallback and the row layout
//! (decoding mode plus how a row maps onto samples and keywords).
//!
//! Built-in profiles cover the supported vendor exports. Additional profiles
//! can be declared in the TOML configuration using the same schema.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::app::models::CanonicalField;
use crate::constants::{
    DEFAULT_SHEET_INDEX, KEYWORD_HEADER_END_TOKEN, NON_ANALYTE_HEADERS, NON_SAMPLE_ROW_MARKERS,
    QUANTITATION_HEADER_PREFIX, QUANTITATION_NAME_LABEL, ZERO_SENTINEL_PREFIX,
    ZERO_SENTINEL_VALUES,
};
use crate::{Error, Result};

// =============================================================================
// Shared Settings
// =============================================================================

/// Concentration unit used for unit disambiguation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Pct,
    Ppm,
}

impl FromStr for Unit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "pct" | "%" | "percent" => Ok(Unit::Pct),
            "ppm" => Ok(Unit::Ppm),
            other => Err(Error::configuration(format!(
                "Invalid unit '{}': expected 'pct' or 'ppm'",
                other
            ))),
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unit::Pct => write!(f, "pct"),
            Unit::Ppm => write!(f, "ppm"),
        }
    }
}

/// Worksheet selector for spreadsheet inputs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SheetSelector {
    Index(usize),
    Name(String),
}

impl Default for SheetSelector {
    fn default() -> Self {
        SheetSelector::Index(DEFAULT_SHEET_INDEX)
    }
}

impl FromStr for SheetSelector {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        Ok(match trimmed.parse::<usize>() {
            Ok(index) => SheetSelector::Index(index),
            Err(_) => SheetSelector::Name(trimmed.to_string()),
        })
    }
}

impl fmt::Display for SheetSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SheetSelector::Index(index) => write!(f, "{}", index),
            SheetSelector::Name(name) => f.write_str(name),
        }
    }
}

/// Rules applied when coercing a raw cell into a numeric result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoercionRules {
    /// Cells starting with this prefix coerce to zero
    pub zero_prefix: String,

    /// Cells equal to one of these values coerce to zero
    pub zero_values: Vec<String>,
}

impl Default for CoercionRules {
    fn default() -> Self {
        Self {
            zero_prefix: ZERO_SENTINEL_PREFIX.to_string(),
            zero_values: ZERO_SENTINEL_VALUES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Unit disambiguation for instruments reporting percent and ppm interchangeably
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitRule {
    /// Unit whose derived reading becomes the primary result
    pub default_unit: Unit,
}

// =============================================================================
// Decoding Modes and Row Layouts
// =============================================================================

/// How the tabular decoder treats the start of the file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodingMode {
    /// First row holds column labels; rows are label → value mappings
    Labeled,
    /// Preamble is scanned until a sentinel header line; rows are positional
    FreeHeader,
}

/// Rule recognizing the header line in free-header mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HeaderSentinel {
    /// First token starts with `prefix`; the keyword is the first word of
    /// the token at `keyword_column`
    FirstTokenPrefix {
        prefix: String,
        keyword_column: usize,
    },
    /// Last token equals `token`; the tokens between the first and the
    /// last are the column keywords
    LastToken { token: String },
}

impl fmt::Display for HeaderSentinel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderSentinel::FirstTokenPrefix { prefix, .. } => {
                write!(f, "(first token starting with '{}')", prefix)
            }
            HeaderSentinel::LastToken { token } => write!(f, "(last token '{}')", token),
        }
    }
}

/// One (sample, analyte, value) triple per row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyteRowsLayout {
    pub sample_column: String,
    pub analyte_column: String,
    pub value_column: String,

    /// Field receiving the value for sample analyses
    pub output_field: CanonicalField,

    /// Fall back to reference-group lookup when the sample is unknown
    #[serde(default)]
    pub reference_fallback: bool,

    /// Field receiving the value for reference analyses
    #[serde(default = "default_reference_field")]
    pub reference_field: CanonicalField,
}

fn default_reference_field() -> CanonicalField {
    CanonicalField::Result
}

/// One sample per row; every non-metadata column names an analyte
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyteColumnsLayout {
    pub sample_column: String,

    /// Columns carrying metadata rather than results
    #[serde(default)]
    pub metadata_columns: Vec<String>,

    /// Sample cells (case-insensitive) marking rows that name no sample
    #[serde(default)]
    pub skip_markers: Vec<String>,

    pub output_field: CanonicalField,
}

/// One analyte per row for a sample named by the file itself
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormulaRowsLayout {
    /// Static instrument column label → canonical field table
    pub field_map: BTreeMap<String, CanonicalField>,

    /// Mapped field holding the analysis keyword
    pub keyword_field: CanonicalField,

    /// Mapped field holding the primary reading
    pub reading_field: CanonicalField,
}

/// Positional keyword columns discovered from a sentinel header line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordColumnsLayout {
    /// Last token of the header line
    pub header_end_token: String,

    /// First token of a data line that closes the data section
    pub data_end_token: String,

    /// Field receiving each column value
    pub output_field: CanonicalField,
}

/// Kind of a fixed positional column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Numeric,
    Text,
}

/// Fixed positional column copied into every record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedColumn {
    pub index: usize,
    pub field: CanonicalField,
    pub kind: ColumnKind,
}

/// One analyte per file (named by the header), fixed positional fields per row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedColumnsLayout {
    pub header_prefix: String,
    pub keyword_column: usize,
    pub sample_column: usize,

    /// Column index and label identifying the column-name line
    pub label_column: usize,
    pub label_value: String,

    pub columns: Vec<FixedColumn>,

    /// Primary result field; `None` leaves result calculation to the LIMS
    #[serde(default)]
    pub default_result: Option<CanonicalField>,

    /// Empty text fields added to every record
    #[serde(default)]
    pub blank_fields: Vec<CanonicalField>,
}

/// Row semantics of an instrument export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowLayout {
    AnalyteRows(AnalyteRowsLayout),
    AnalyteColumns(AnalyteColumnsLayout),
    FormulaRows(FormulaRowsLayout),
    KeywordColumns(KeywordColumnsLayout),
    FixedColumns(FixedColumnsLayout),
}

impl RowLayout {
    /// Decoding mode required by this layout
    pub fn decoding_mode(&self) -> DecodingMode {
        match self {
            RowLayout::AnalyteRows(_) | RowLayout::AnalyteColumns(_) | RowLayout::FormulaRows(_) => {
                DecodingMode::Labeled
            }
            RowLayout::KeywordColumns(_) | RowLayout::FixedColumns(_) => DecodingMode::FreeHeader,
        }
    }

    /// Header sentinel for free-header layouts
    pub fn header_sentinel(&self) -> Option<HeaderSentinel> {
        match self {
            RowLayout::KeywordColumns(layout) => Some(HeaderSentinel::LastToken {
                token: layout.header_end_token.clone(),
            }),
            RowLayout::FixedColumns(layout) => Some(HeaderSentinel::FirstTokenPrefix {
                prefix: layout.header_prefix.clone(),
                keyword_column: layout.keyword_column,
            }),
            _ => None,
        }
    }

    /// Short layout name for reports
    pub fn kind(&self) -> &'static str {
        match self {
            RowLayout::AnalyteRows(_) => "analyte_rows",
            RowLayout::AnalyteColumns(_) => "analyte_columns",
            RowLayout::FormulaRows(_) => "formula_rows",
            RowLayout::KeywordColumns(_) => "keyword_columns",
            RowLayout::FixedColumns(_) => "fixed_columns",
        }
    }
}

// =============================================================================
// Instrument Profile
// =============================================================================

/// Complete parsing configuration for one instrument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentProfile {
    /// Identifier used on the command line (e.g. "s8tiger")
    pub name: String,

    /// Human-readable instrument name
    pub title: String,

    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    #[serde(default)]
    pub sheet: SheetSelector,

    #[serde(default)]
    pub coercion: CoercionRules,

    #[serde(default)]
    pub unit_rule: Option<UnitRule>,

    #[serde(default)]
    pub interim_fallback: bool,

    pub layout: RowLayout,
}

fn default_delimiter() -> char {
    ','
}

impl InstrumentProfile {
    /// Delimiter as a byte for the CSV reader
    pub fn delimiter_byte(&self) -> Result<u8> {
        if self.delimiter.is_ascii() {
            Ok(self.delimiter as u8)
        } else {
            Err(Error::configuration(format!(
                "Profile '{}': delimiter '{}' must be a single ASCII character",
                self.name, self.delimiter
            )))
        }
    }

    /// Override the worksheet selector
    pub fn with_sheet(mut self, sheet: SheetSelector) -> Self {
        self.sheet = sheet;
        self
    }

    /// Override the delimiter
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Override the default unit of the unit rule, if the profile has one
    pub fn with_default_unit(mut self, unit: Unit) -> Self {
        if let Some(rule) = self.unit_rule.as_mut() {
            rule.default_unit = unit;
        }
        self
    }

    /// Validate internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::configuration("Profile name cannot be empty"));
        }
        self.delimiter_byte()?;

        match &self.layout {
            RowLayout::FormulaRows(layout) => {
                let mapped: Vec<&CanonicalField> = layout.field_map.values().collect();
                for required in [&layout.keyword_field, &layout.reading_field] {
                    if !mapped.contains(&required) {
                        return Err(Error::configuration(format!(
                            "Profile '{}': field '{}' is not produced by the field map",
                            self.name, required
                        )));
                    }
                }
            }
            RowLayout::FixedColumns(layout) if layout.columns.is_empty() => {
                return Err(Error::configuration(format!(
                    "Profile '{}': fixed column layout needs at least one column",
                    self.name
                )));
            }
            _ => {}
        }
        Ok(())
    }
}

// =============================================================================
// Built-in Profiles
// =============================================================================

/// PerkinElmer WinLab32: one analyte reading per row
pub fn winlab32() -> InstrumentProfile {
    InstrumentProfile {
        name: "winlab32".to_string(),
        title: "Perkin Elmer Winlab32".to_string(),
        delimiter: default_delimiter(),
        sheet: SheetSelector::default(),
        coercion: CoercionRules::default(),
        unit_rule: None,
        interim_fallback: false,
        layout: RowLayout::AnalyteRows(AnalyteRowsLayout {
            sample_column: "Sample ID".to_string(),
            analyte_column: "Analyte Name".to_string(),
            value_column: "Reported Conc (Calib)".to_string(),
            output_field: CanonicalField::Reading,
            reference_fallback: true,
            reference_field: CanonicalField::Result,
        }),
    }
}

/// PerkinElmer NexION 350X: one sample per row, analytes as columns
pub fn nexion350x() -> InstrumentProfile {
    InstrumentProfile {
        name: "nexion350x".to_string(),
        title: "Perkin Elmer Nexion 350X".to_string(),
        delimiter: default_delimiter(),
        sheet: SheetSelector::default(),
        coercion: CoercionRules::default(),
        unit_rule: None,
        interim_fallback: false,
        layout: RowLayout::AnalyteColumns(AnalyteColumnsLayout {
            sample_column: "Sample Id".to_string(),
            metadata_columns: NON_ANALYTE_HEADERS.iter().map(|s| s.to_string()).collect(),
            skip_markers: NON_SAMPLE_ROW_MARKERS.iter().map(|s| s.to_string()).collect(),
            output_field: CanonicalField::Reading,
        }),
    }
}

/// Bruker S8 Tiger: one formula per row, sample named by the file
pub fn s8tiger() -> InstrumentProfile {
    let field_map = [
        ("Formula", CanonicalField::Formula),
        ("Concentration", CanonicalField::Reading),
        ("Z", CanonicalField::Z),
        ("Status", CanonicalField::Status),
        ("Line 1", CanonicalField::Line1),
        ("Net int.", CanonicalField::NetInt),
        ("LLD", CanonicalField::Lld),
        ("Stat. error", CanonicalField::StatError),
        ("Analyzed layer", CanonicalField::AnalyzedLayer),
        ("Bound %", CanonicalField::BoundPct),
    ]
    .into_iter()
    .map(|(label, field)| (label.to_string(), field))
    .collect();

    InstrumentProfile {
        name: "s8tiger".to_string(),
        title: "Bruker S8 Tiger".to_string(),
        delimiter: default_delimiter(),
        sheet: SheetSelector::default(),
        coercion: CoercionRules::default(),
        unit_rule: Some(UnitRule {
            default_unit: Unit::Pct,
        }),
        interim_fallback: false,
        layout: RowLayout::FormulaRows(FormulaRowsLayout {
            field_map,
            keyword_field: CanonicalField::Formula,
            reading_field: CanonicalField::Reading,
        }),
    }
}

/// Thermo XCalibur: keyword header line closed by "end", interim fallback
pub fn xcalibur() -> InstrumentProfile {
    InstrumentProfile {
        name: "xcalibur".to_string(),
        title: "XCalibur".to_string(),
        delimiter: default_delimiter(),
        sheet: SheetSelector::default(),
        coercion: CoercionRules::default(),
        unit_rule: None,
        interim_fallback: true,
        layout: RowLayout::KeywordColumns(KeywordColumnsLayout {
            header_end_token: KEYWORD_HEADER_END_TOKEN.to_string(),
            data_end_token: KEYWORD_HEADER_END_TOKEN.to_string(),
            output_field: CanonicalField::ResultValue,
        }),
    }
}

/// Agilent MassHunter Quantitative: one compound per file, fixed columns
pub fn masshunter_quant() -> InstrumentProfile {
    let numeric = |index, field| FixedColumn {
        index,
        field,
        kind: ColumnKind::Numeric,
    };

    InstrumentProfile {
        name: "masshunter_quant".to_string(),
        title: "Agilent Masshunter Quantitative".to_string(),
        delimiter: default_delimiter(),
        sheet: SheetSelector::default(),
        coercion: CoercionRules::default(),
        unit_rule: None,
        interim_fallback: false,
        layout: RowLayout::FixedColumns(FixedColumnsLayout {
            header_prefix: QUANTITATION_HEADER_PREFIX.to_string(),
            keyword_column: 7,
            sample_column: 2,
            label_column: 2,
            label_value: QUANTITATION_NAME_LABEL.to_string(),
            columns: vec![
                FixedColumn {
                    index: 6,
                    field: CanonicalField::DateTime,
                    kind: ColumnKind::Text,
                },
                numeric(8, CanonicalField::ReturnTime),
                numeric(9, CanonicalField::Resp),
                numeric(10, CanonicalField::CalcConc),
                numeric(11, CanonicalField::FinalConc),
                numeric(12, CanonicalField::Accuracy),
                numeric(13, CanonicalField::Ratio),
                numeric(14, CanonicalField::Mi),
            ],
            default_result: None,
            blank_fields: vec![CanonicalField::Remarks],
        }),
    }
}

/// All built-in instrument profiles
pub fn builtin_profiles() -> Vec<InstrumentProfile> {
    vec![
        winlab32(),
        nexion350x(),
        s8tiger(),
        xcalibur(),
        masshunter_quant(),
    ]
}
