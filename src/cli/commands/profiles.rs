//! Profiles command implementation
//!
//! Lists the built-in instrument profiles together with any profiles added
//! or overridden by the configuration file.

use super::shared::{CommandStats, load_configuration};
use crate::cli::args::{OutputFormat, ProfilesArgs};
use crate::config::ImporterConfig;
use crate::profiles::InstrumentProfile;
use crate::{Error, Result};
use colored::*;
use tracing::debug;

/// Profiles command runner
pub async fn run_profiles(args: ProfilesArgs) -> Result<CommandStats> {
    let config = load_configuration(args.config_file.as_deref())?;
    let profiles = config.available_profiles();
    debug!("{} profiles available", profiles.len());

    match args.format {
        OutputFormat::Summary => print!("{}", render_summary(&config, &profiles)),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&profiles)
                .map_err(|e| Error::serialization("Failed to serialize profiles", e))?;
            println!("{}", json);
        }
    }

    Ok(CommandStats::default())
}

fn render_summary(config: &ImporterConfig, profiles: &[InstrumentProfile]) -> String {
    let mut out = format!("{}\n", "Instrument profiles".bold());

    for profile in profiles {
        let mut line = format!(
            "   • {:<18} {:<36} {}",
            profile.name.green(),
            profile.title,
            profile.layout.kind().dimmed()
        );
        if config.default_profile.as_deref() == Some(profile.name.as_str()) {
            line.push_str(&format!(" {}", "(default)".cyan()));
        }
        if config.is_custom_profile(&profile.name) {
            line.push_str(&format!(" {}", "(configured)".yellow()));
        }
        out.push_str(&line);
        out.push('\n');
    }
    out
}
