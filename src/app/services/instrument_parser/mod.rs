//! Instrument result file parser
//!
//! This module turns vendor instrument exports (CSV, XLS, XLSX) into a
//! [`ResultSet`](crate::app::models::ResultSet) keyed by sample identifier and
//! analysis keyword. One generic engine is parameterized by an
//! [`InstrumentProfile`](crate::profiles::InstrumentProfile) instead of one
//! parser per instrument.
//!
//! ## Architecture
//!
//! The parser is organized into logical components:
//! - [`format`] - File format detection and spreadsheet conversion order
//! - [`decoder`] - Text decoding and positional/labeled row production
//! - [`header`] - Sentinel header scanning for free-header exports
//! - [`field_mapping`] - Instrument column label to canonical field mapping
//! - [`keyword_resolver`] - Prefix keyword matching with interim fallback
//! - [`coercion`] - Numeric result coercion and unit disambiguation
//! - [`accumulator`] - Per-pass result collection
//! - [`diagnostics`] - Error, warning and log collection
//! - [`layouts`] - Row semantics of each supported layout
//! - [`parser`] - Pass orchestration and the parse state machine
//! - [`stats`] - Parsing statistics
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use instrument_results::app::services::catalog::InMemoryCatalog;
//! use instrument_results::app::services::instrument_parser::InstrumentParser;
//! use instrument_results::profiles;
//!
//! # fn example() -> instrument_results::Result<()> {
//! let catalog = InMemoryCatalog::load(std::path::Path::new("catalog.json"))?;
//! let parser = InstrumentParser::new(profiles::winlab32(), Arc::new(catalog));
//! let outcome = parser.parse_path(std::path::Path::new("results.csv"))?;
//!
//! println!("{} records, {} errors", outcome.results.record_count(), outcome.errors.len());
//! # Ok(())
//! # }
//! ```

pub mod accumulator;
pub mod coercion;
pub mod decoder;
pub mod diagnostics;
pub mod field_mapping;
pub mod format;
pub mod header;
pub mod keyword_resolver;
pub mod layouts;
pub mod parser;
pub mod stats;

#[cfg(test)]
pub mod tests;

// Re-export main types for easy access
pub use diagnostics::DiagnosticsSink;
pub use format::FormatKind;
pub use parser::{InstrumentFile, InstrumentParser, ParseOutcome, ParsePhase};
pub use stats::ParseStats;
