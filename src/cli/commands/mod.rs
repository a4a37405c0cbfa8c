//! Command implementations for the instrument results CLI
//!
//! Each subcommand lives in its own module:
//! - `import`: parse instrument files and report results
//! - `profiles`: list available instrument profiles
//! - `detect`: show detected file formats

pub mod detect;
pub mod import;
pub mod profiles;
pub mod shared;

pub use shared::CommandStats;

use crate::Result;
use crate::cli::args::{Args, Commands};

/// Dispatch to the subcommand handler
pub async fn run(args: Args) -> Result<CommandStats> {
    match args.get_command() {
        Commands::Import(import_args) => import::run_import(import_args).await,
        Commands::Profiles(profiles_args) => profiles::run_profiles(profiles_args).await,
        Commands::Detect(detect_args) => detect::run_detect(detect_args).await,
    }
}
