//! Command-line argument definitions for the instrument results importer
//!
//! This module defines the CLI interface using the clap derive API.

use crate::profiles::{SheetSelector, Unit};
use crate::{Error, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for the instrument results importer
///
/// Parses laboratory instrument result files (CSV, XLS, XLSX) into
/// normalized per-sample, per-analysis results ready for LIMS import.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "instrument-results",
    version,
    about = "Parse laboratory instrument result files into normalized LIMS results",
    long_about = "Translates vendor-specific instrument exports (CSV, XLS, XLSX) into raw results \
                  keyed by sample identifier and analysis keyword. Every file is parsed against a \
                  sample catalog and reported with its errors, warnings and informational log."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Args {
    /// Get the command, defaulting to listing profiles when none is given
    pub fn get_command(self) -> Commands {
        self.command.unwrap_or(Commands::Profiles(ProfilesArgs {
            config_file: None,
            format: OutputFormat::Summary,
        }))
    }
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Parse instrument result files and report the results
    Import(ImportArgs),
    /// List available instrument profiles
    Profiles(ProfilesArgs),
    /// Show the detected format of files without parsing them
    Detect(DetectArgs),
}

/// Arguments for the import command
#[derive(Debug, Clone, Parser)]
pub struct ImportArgs {
    /// Instrument result files or directories
    ///
    /// Directories are searched recursively for CSV, XLS and XLSX files.
    #[arg(value_name = "PATHS", required = true)]
    pub paths: Vec<PathBuf>,

    /// Instrument profile name (see the `profiles` command)
    ///
    /// Falls back to `default_profile` from the configuration.
    #[arg(short = 'p', long = "profile", value_name = "NAME")]
    pub profile: Option<String>,

    /// Sample catalog snapshot (JSON)
    #[arg(long = "catalog", value_name = "FILE")]
    pub catalog: PathBuf,

    /// Worksheet to read from spreadsheet files (index or name)
    #[arg(long = "sheet", value_name = "SHEET")]
    pub sheet: Option<SheetSelector>,

    /// Unit whose reading becomes the primary result (pct or ppm)
    #[arg(long = "default-unit", value_name = "UNIT")]
    pub default_unit: Option<Unit>,

    /// Field delimiter for delimited text
    #[arg(long = "delimiter", value_name = "CHAR")]
    pub delimiter: Option<char>,

    /// Write the JSON reports to this file instead of stdout
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Report format
    #[arg(long = "format", value_enum, default_value = "summary")]
    pub format: OutputFormat,

    /// Number of files parsed concurrently
    #[arg(
        short = 'j',
        long = "workers",
        value_name = "N",
        help = "Number of files parsed concurrently"
    )]
    pub workers: Option<usize>,

    /// Configuration file (TOML)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Increase logging verbosity
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Suppress output except errors
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

impl ImportArgs {
    /// Validate argument combinations clap cannot express
    pub fn validate(&self) -> Result<()> {
        if let Some(0) = self.workers {
            return Err(Error::configuration("Worker count must be greater than 0"));
        }
        if let Some(delimiter) = self.delimiter {
            if !delimiter.is_ascii() {
                return Err(Error::configuration(format!(
                    "Delimiter '{}' must be a single ASCII character",
                    delimiter
                )));
            }
        }
        Ok(())
    }

    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    /// Check if we should show progress bars (not in quiet mode)
    pub fn show_progress(&self) -> bool {
        !self.quiet && self.format == OutputFormat::Summary
    }
}

/// Arguments for the profiles command
#[derive(Debug, Clone, Parser)]
pub struct ProfilesArgs {
    /// Configuration file (TOML) with additional profiles
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Output format
    #[arg(long = "format", value_enum, default_value = "summary")]
    pub format: OutputFormat,
}

/// Arguments for the detect command
#[derive(Debug, Clone, Parser)]
pub struct DetectArgs {
    /// Files to inspect
    #[arg(value_name = "FILES", required = true)]
    pub files: Vec<PathBuf>,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Colored human-readable summary
    Summary,
    /// JSON reports
    Json,
}
