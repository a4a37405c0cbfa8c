//! Import command implementation
//!
//! Loads configuration and the sample catalog, parses every instrument file
//! on a bounded pool of blocking workers and reports the outcome per file.

use super::shared::{
    CommandStats, apply_cli_overrides, create_progress_bar, expand_paths, load_configuration,
    setup_logging,
};
use crate::app::services::catalog::{InMemoryCatalog, SampleCatalog};
use crate::app::services::importer::ImportReport;
use crate::app::services::instrument_parser::{InstrumentFile, InstrumentParser};
use crate::cli::args::{ImportArgs, OutputFormat};
use crate::{Error, Result};
use colored::*;
use futures::stream::{self, StreamExt};
use indicatif::{HumanDuration, ProgressBar};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Import command runner
///
/// 1. Set up logging and configuration
/// 2. Resolve the instrument profile and load the catalog
/// 3. Parse files concurrently with progress reporting
/// 4. Write reports and summary statistics
pub async fn run_import(args: ImportArgs) -> Result<CommandStats> {
    let start_time = Instant::now();

    setup_logging(args.get_log_level(), args.quiet)?;

    info!("Starting instrument results import");
    debug!("Command line arguments: {:?}", args);

    args.validate()?;

    let config = apply_cli_overrides(load_configuration(args.config_file.as_deref())?, &args);
    config.validate()?;

    let profile = config.resolve_profile(args.profile.as_deref())?;
    info!(
        "Using profile '{}' ({}, {} layout)",
        profile.name,
        profile.title,
        profile.layout.kind()
    );

    let catalog: Arc<dyn SampleCatalog> = Arc::new(InMemoryCatalog::load(&args.catalog)?);

    let files = expand_paths(&args.paths)?;
    if files.is_empty() {
        return Err(Error::configuration(
            "No CSV, XLS or XLSX files found in the given paths",
        ));
    }
    info!("Parsing {} files with {} workers", files.len(), config.workers);

    let parser = Arc::new(InstrumentParser::new(profile, catalog));

    let progress = (args.show_progress() && files.len() > 1)
        .then(|| create_progress_bar(files.len() as u64, "Parsing files"));

    let reports = parse_files(parser, &files, config.workers, progress.as_ref()).await;

    if let Some(pb) = &progress {
        pb.finish_with_message("Parsing complete");
    }

    let mut stats = collect_stats(&reports);
    stats.processing_time = start_time.elapsed();

    write_reports(&reports, &args, &stats).await?;

    info!(
        "Import finished: {}/{} files succeeded in {:.2}s",
        stats.files_processed - stats.files_failed,
        stats.files_processed,
        stats.processing_time.as_secs_f64()
    );
    Ok(stats)
}

/// Parse files concurrently, returning reports in input order
///
/// Parsing is CPU-bound and synchronous, so each file runs on the blocking
/// pool; at most `workers` files are in flight at once. The parser is
/// shared: every `parse` call owns its pass state.
pub async fn parse_files(
    parser: Arc<InstrumentParser>,
    files: &[PathBuf],
    workers: usize,
    progress: Option<&ProgressBar>,
) -> Vec<ImportReport> {
    let mut indexed: Vec<(usize, ImportReport)> = stream::iter(files.iter().cloned().enumerate())
        .map(|(index, path)| {
            let parser = Arc::clone(&parser);
            async move {
                let file = path.display().to_string();
                let profile = parser.profile().name.clone();
                let report = match tokio::task::spawn_blocking(move || parse_one(&parser, &path))
                    .await
                {
                    Ok(report) => report,
                    Err(e) => {
                        let error = Error::task(e.to_string());
                        warn!("{}: {}", file, error);
                        ImportReport::unreadable(file, profile, &error)
                    }
                };
                (index, report)
            }
        })
        .buffer_unordered(workers.max(1))
        .inspect(|_| {
            if let Some(pb) = progress {
                pb.inc(1);
            }
        })
        .collect()
        .await;

    indexed.sort_by_key(|(index, _)| *index);
    indexed.into_iter().map(|(_, report)| report).collect()
}

fn parse_one(parser: &InstrumentParser, path: &Path) -> ImportReport {
    let file = path.display().to_string();
    let profile = parser.profile().name.clone();

    match InstrumentFile::read(path) {
        Ok(instrument_file) => {
            let outcome = parser.parse(&instrument_file);
            debug!(
                "{}: {} ({} records, {} errors, {} warnings)",
                file,
                outcome.status,
                outcome.results.record_count(),
                outcome.errors.len(),
                outcome.warnings.len()
            );
            ImportReport::from_outcome(file, profile, outcome)
        }
        Err(e) => {
            warn!("Could not read {}: {}", file, e);
            ImportReport::unreadable(file, profile, &e)
        }
    }
}

/// Aggregate command statistics over all reports
pub fn collect_stats(reports: &[ImportReport]) -> CommandStats {
    let mut stats = CommandStats {
        files_processed: reports.len(),
        ..Default::default()
    };

    for report in reports {
        if !report.is_success() {
            stats.files_failed += 1;
        }
        stats.samples += report.results.sample_count();
        stats.records += report.results.record_count();
        stats.errors += report.errors.len();
        stats.warnings += report.warns.len();
    }
    stats
}

async fn write_reports(
    reports: &[ImportReport],
    args: &ImportArgs,
    stats: &CommandStats,
) -> Result<()> {
    let json = || {
        serde_json::to_string_pretty(reports)
            .map_err(|e| Error::serialization("Failed to serialize import reports", e))
    };

    if let Some(path) = &args.output {
        tokio::fs::write(path, json()?).await.map_err(|e| {
            Error::io(format!("Failed to write reports to {}", path.display()), e)
        })?;
        info!("Reports written to {}", path.display());
    }

    match args.format {
        OutputFormat::Json if args.output.is_none() => println!("{}", json()?),
        OutputFormat::Json => {}
        OutputFormat::Summary if !args.quiet => print_summary(reports, stats),
        OutputFormat::Summary => {}
    }
    Ok(())
}

fn print_summary(reports: &[ImportReport], stats: &CommandStats) {
    for report in reports {
        let status = if report.is_success() {
            "success".green().bold()
        } else {
            "failure".red().bold()
        };
        println!(
            "{} {} ({} samples, {} records)",
            status,
            report.file.bold(),
            report.results.sample_count(),
            report.results.record_count()
        );
        for error in &report.errors {
            println!("    {} {}", "error:".red(), error);
        }
        for warning in &report.warns {
            println!("    {} {}", "warn:".yellow(), warning);
        }
    }

    println!();
    println!("{}", "Import Summary".bold());
    println!("   • Files parsed: {}", stats.files_processed);
    if stats.files_failed > 0 {
        println!(
            "   • Files failed: {}",
            stats.files_failed.to_string().red()
        );
    }
    println!("   • Samples: {}", stats.samples);
    println!("   • Records: {}", stats.records);
    println!("   • Errors: {}", stats.errors);
    println!("   • Warnings: {}", stats.warnings);
    println!(
        "   • Processing time: {}",
        HumanDuration(stats.processing_time)
    );
}
