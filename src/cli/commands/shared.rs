//! Shared components for CLI commands
//!
//! This module contains common types, utilities, and functions used across
//! multiple CLI command implementations.

use crate::app::services::instrument_parser::FormatKind;
use crate::cli::args::ImportArgs;
use crate::config::ImporterConfig;
use crate::{Error, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Command statistics used for reporting and the process exit code
#[derive(Debug, Clone, Default)]
pub struct CommandStats {
    /// Number of files handled
    pub files_processed: usize,
    /// Number of files rejected or unreadable
    pub files_failed: usize,
    /// Number of samples with results
    pub samples: usize,
    /// Number of records across all files
    pub records: usize,
    /// Number of error diagnostics
    pub errors: usize,
    /// Number of warning diagnostics
    pub warnings: usize,
    /// Total processing time
    pub processing_time: std::time::Duration,
}

impl CommandStats {
    /// True when every file was handled successfully
    pub fn is_success(&self) -> bool {
        self.files_failed == 0
    }

    /// Percentage of files handled successfully
    pub fn success_rate(&self) -> f64 {
        if self.files_processed == 0 {
            0.0
        } else {
            (self.files_processed - self.files_failed) as f64 / self.files_processed as f64
                * 100.0
        }
    }
}

/// Set up structured logging on stderr
pub fn setup_logging(log_level: &str, quiet: bool) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    // Create filter
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("instrument_results={}", log_level)));

    let result = if quiet {
        // Minimal logging for quiet mode
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
    } else {
        // Standard logging with timestamps
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };

    result.map_err(|e| Error::configuration(format!("Failed to initialize logging: {}", e)))?;
    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Load configuration using the layered approach (defaults -> file -> env)
pub fn load_configuration(config_file: Option<&Path>) -> Result<ImporterConfig> {
    info!("Loading configuration");

    match config_file {
        Some(path) => info!("Using config file: {}", path.display()),
        None => match ImporterConfig::default_config_path().filter(|path| path.exists()) {
            Some(path) => info!("Using config file: {}", path.display()),
            None => info!("No config file found, using defaults and environment variables"),
        },
    }

    ImporterConfig::load(config_file)
}

/// Apply CLI argument overrides to configuration
pub fn apply_cli_overrides(mut config: ImporterConfig, args: &ImportArgs) -> ImporterConfig {
    if let Some(workers) = args.workers {
        config = config.with_workers(workers);
    }
    if let Some(delimiter) = args.delimiter {
        config = config.with_delimiter(delimiter);
    }
    if let Some(sheet) = &args.sheet {
        config = config.with_sheet(sheet.clone());
    }
    if let Some(unit) = args.default_unit {
        config = config.with_default_unit(unit);
    }
    config
}

/// Expand input paths into instrument files
///
/// Files are kept as given; directories are walked recursively for files
/// with a supported extension. The result is sorted and deduplicated.
pub fn expand_paths(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path).follow_links(false) {
                let entry = entry.map_err(|e| {
                    Error::directory_traversal(format!("Failed to walk {}", path.display()), e)
                })?;
                let entry_path = entry.path();
                if entry_path.is_file() && is_supported(entry_path) {
                    files.push(entry_path.to_path_buf());
                }
            }
        } else if path.exists() {
            files.push(path.clone());
        } else {
            return Err(Error::configuration(format!(
                "Input path does not exist: {}",
                path.display()
            )));
        }
    }

    files.sort();
    files.dedup();

    debug!("Discovered {} instrument files", files.len());
    for file in &files {
        debug!("  Found: {}", file.display());
    }
    Ok(files)
}

fn is_supported(path: &Path) -> bool {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy())
        .unwrap_or_default();
    FormatKind::detect(&name) != FormatKind::Unknown
}

/// Create a progress bar with appropriate styling
pub fn create_progress_bar(total: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg} ETA: {eta}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_command_stats_success_rate() {
        let stats = CommandStats {
            files_processed: 4,
            files_failed: 1,
            ..Default::default()
        };
        assert!((stats.success_rate() - 75.0).abs() < f64::EPSILON);
        assert!(!stats.is_success());
        assert_eq!(CommandStats::default().success_rate(), 0.0);
    }

    #[test]
    fn test_expand_paths_walks_directories() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("batch");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(temp_dir.path().join("b.csv"), "x").unwrap();
        std::fs::write(nested.join("a.XLSX"), "x").unwrap();
        std::fs::write(nested.join("notes.txt"), "x").unwrap();

        let files = expand_paths(&[temp_dir.path().to_path_buf()]).unwrap();

        assert_eq!(files.len(), 2);
        assert!(files.iter().any(|f| f.ends_with("b.csv")));
        assert!(files.iter().any(|f| f.ends_with("batch/a.XLSX")));
    }

    #[test]
    fn test_expand_paths_keeps_explicit_files() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("run.txt");
        std::fs::write(&file, "x").unwrap();

        let files = expand_paths(&[file.clone(), file.clone()]).unwrap();
        assert_eq!(files, vec![file]);
    }

    #[test]
    fn test_expand_paths_missing_input() {
        let temp_dir = TempDir::new().unwrap();
        assert!(expand_paths(&[temp_dir.path().join("missing.csv")]).is_err());
    }

    #[test]
    fn test_apply_cli_overrides() {
        use crate::profiles::Unit;
        use clap::Parser;

        let args = crate::cli::args::ImportArgs::try_parse_from([
            "import",
            "--catalog",
            "c.json",
            "-j",
            "3",
            "--default-unit",
            "ppm",
            "a.csv",
        ])
        .unwrap();

        let config = apply_cli_overrides(ImporterConfig::default(), &args);
        assert_eq!(config.workers, 3);
        assert_eq!(config.default_unit, Some(Unit::Ppm));
        assert_eq!(config.delimiter, None);
    }
}
