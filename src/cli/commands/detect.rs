//! Detect command implementation
//!
//! Reports the format detected for each file and, for spreadsheets, the
//! order in which conversions would be attempted. Nothing is parsed.

use super::shared::CommandStats;
use crate::app::services::instrument_parser::FormatKind;
use crate::cli::args::DetectArgs;
use crate::Result;
use colored::*;
use std::path::Path;

/// Detect command runner
pub async fn run_detect(args: DetectArgs) -> Result<CommandStats> {
    let mut stats = CommandStats::default();

    for path in &args.files {
        let format = detect_path(path);
        stats.files_processed += 1;
        if format == FormatKind::Unknown {
            stats.files_failed += 1;
        }
        println!("{}", describe(path, format));
    }

    Ok(stats)
}

fn detect_path(path: &Path) -> FormatKind {
    path.file_name()
        .map(|name| FormatKind::detect(&name.to_string_lossy()))
        .unwrap_or(FormatKind::Unknown)
}

fn describe(path: &Path, format: FormatKind) -> String {
    let order = format.conversion_order();
    let label = match format {
        FormatKind::Unknown => "unsupported".red().to_string(),
        other => other.to_string().green().to_string(),
    };

    if order.is_empty() {
        format!("{}: {}", path.display(), label)
    } else {
        let attempts: Vec<String> = order.iter().map(ToString::to_string).collect();
        format!(
            "{}: {} (conversion order: {})",
            path.display(),
            label,
            attempts.join(" -> ")
        )
    }
}
