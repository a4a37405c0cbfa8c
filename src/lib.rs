//! Instrument Results Library
//!
//! A Rust library for translating vendor-specific laboratory instrument
//! result files into normalized raw results keyed by sample identifier and
//! analysis keyword, ready to be applied to LIMS sample records.
//!
//! This library provides tools for:
//! - Detecting file formats and converting XLS/XLSX workbooks to delimited text
//! - Decoding labeled (header row) and free-header (sentinel scanned) layouts
//! - Mapping instrument column labels to canonical result fields
//! - Resolving analysis keywords by prefix match with interim-field fallback
//! - Coercing numeric results with sentinel, clamping and unit rules
//! - Collecting structured error, warning and log diagnostics per parse pass

pub mod config;
pub mod constants;
pub mod profiles;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod catalog;
        pub mod importer;
        pub mod instrument_parser;
        pub mod spreadsheet;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::models::{
    CanonicalField, Diagnostic, FieldValue, Keyword, ParseStatus, ResultRecord, ResultSet,
    Severity,
};
pub use app::services::instrument_parser::{InstrumentFile, InstrumentParser, ParseOutcome};
pub use config::ImporterConfig;
pub use profiles::InstrumentProfile;

/// Result type alias for instrument result processing
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for instrument result processing operations
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Delimited text could not be decoded
    #[error("CSV parsing error in file '{file}': {message}")]
    CsvParsing {
        file: String,
        message: String,
        #[source]
        source: Option<csv::Error>,
    },

    /// File extension is not one of the supported formats
    #[error("{file} is not an XLS, XLSX, or CSV document")]
    UnsupportedFormat { file: String },

    /// The requested worksheet does not exist in the workbook
    #[error("Sheet not found in workbook: {sheet}")]
    SheetNotFound { sheet: String },

    /// Every spreadsheet conversion attempt failed
    #[error("Can't parse input file as XLS, XLSX, or CSV: {message}")]
    Conversion { message: String },

    /// Free-header scan reached end of file without a sentinel line
    #[error("Header sentinel {sentinel} not found in file '{file}'")]
    HeaderNotFound { file: String, sentinel: String },

    /// Directory traversal error while expanding input paths
    #[error("Directory traversal error: {message}")]
    DirectoryTraversal {
        message: String,
        #[source]
        source: walkdir::Error,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Sample catalog could not be loaded
    #[error("Catalog error: {message}")]
    Catalog { message: String },

    /// Requested instrument profile is not registered
    #[error("Unknown instrument profile: {name}")]
    UnknownProfile { name: String },

    /// Results could not be handed to the importer sink
    #[error("Result submission failed for sample '{sample_id}': {message}")]
    Submission { sample_id: String, message: String },

    /// A background parsing task did not complete
    #[error("Worker task failed: {message}")]
    Task { message: String },

    /// Report serialization error
    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a CSV parsing error with context
    pub fn csv_parsing(
        file: impl Into<String>,
        message: impl Into<String>,
        source: Option<csv::Error>,
    ) -> Self {
        Self::CsvParsing {
            file: file.into(),
            message: message.into(),
            source,
        }
    }

    /// Create an unsupported format error
    pub fn unsupported_format(file: impl Into<String>) -> Self {
        Self::UnsupportedFormat { file: file.into() }
    }

    /// Create a sheet not found error
    pub fn sheet_not_found(sheet: impl Into<String>) -> Self {
        Self::SheetNotFound {
            sheet: sheet.into(),
        }
    }

    /// Create a conversion error
    pub fn conversion(message: impl Into<String>) -> Self {
        Self::Conversion {
            message: message.into(),
        }
    }

    /// Create a header not found error
    pub fn header_not_found(file: impl Into<String>, sentinel: impl Into<String>) -> Self {
        Self::HeaderNotFound {
            file: file.into(),
            sentinel: sentinel.into(),
        }
    }

    /// Create a directory traversal error
    pub fn directory_traversal(message: impl Into<String>, source: walkdir::Error) -> Self {
        Self::DirectoryTraversal {
            message: message.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a catalog error
    pub fn catalog(message: impl Into<String>) -> Self {
        Self::Catalog {
            message: message.into(),
        }
    }

    /// Create an unknown profile error
    pub fn unknown_profile(name: impl Into<String>) -> Self {
        Self::UnknownProfile { name: name.into() }
    }

    /// Create a submission error
    pub fn submission(sample_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Submission {
            sample_id: sample_id.into(),
            message: message.into(),
        }
    }

    /// Create a task failure error
    pub fn task(message: impl Into<String>) -> Self {
        Self::Task {
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialization {
            message: message.into(),
            source,
        }
    }
}

// Automatic conversions from common error types
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

impl From<csv::Error> for Error {
    fn from(error: csv::Error) -> Self {
        Self::CsvParsing {
            file: "unknown".to_string(),
            message: "CSV parsing failed".to_string(),
            source: Some(error),
        }
    }
}

impl From<walkdir::Error> for Error {
    fn from(error: walkdir::Error) -> Self {
        Self::DirectoryTraversal {
            message: "Directory traversal failed".to_string(),
            source: error,
        }
    }
}

impl From<figment::Error> for Error {
    fn from(error: figment::Error) -> Self {
        Self::Configuration {
            message: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization {
            message: "JSON serialization failed".to_string(),
            source: error,
        }
    }
}
