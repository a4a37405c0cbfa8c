use anyhow::Context;
use clap::Parser;
use instrument_results::cli::{args::Args, commands};
use std::process;

fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    let runtime = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;

    let result = runtime.block_on(async {
        tokio::select! {
            result = commands::run(args) => result.map_err(anyhow::Error::from),
            _ = tokio::signal::ctrl_c() => {
                eprintln!("\nReceived CTRL+C, shutting down...");
                Err(anyhow::anyhow!("Import interrupted by user"))
            }
        }
    });

    match result {
        Ok(stats) if stats.is_success() => Ok(()),
        Ok(stats) => {
            eprintln!(
                "{} of {} files failed",
                stats.files_failed, stats.files_processed
            );
            process::exit(1);
        }
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}
