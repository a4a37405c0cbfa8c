//! Configuration management and validation.
//!
//! Provides the importer configuration, loaded in layers: built-in
//! defaults, the TOML configuration file, `INSTRUMENT_RESULTS_*`
//! environment variables and finally command-line overrides. The
//! configuration also carries user-defined instrument profiles that
//! extend (or replace) the built-in ones.

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::constants::{CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_PARALLEL_WORKERS, ENV_PREFIX};
use crate::profiles::{InstrumentProfile, SheetSelector, Unit, builtin_profiles};
use crate::{Error, Result};

/// Global configuration for instrument result imports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImporterConfig {
    /// Number of files parsed concurrently
    pub workers: usize,

    /// Profile used when none is given on the command line
    pub default_profile: Option<String>,

    /// Delimiter override applied to the selected profile
    pub delimiter: Option<char>,

    /// Worksheet override applied to the selected profile
    pub sheet: Option<SheetSelector>,

    /// Default unit override for profiles with unit disambiguation
    pub default_unit: Option<Unit>,

    /// User-defined instrument profiles
    pub profiles: Vec<InstrumentProfile>,
}

impl Default for ImporterConfig {
    fn default() -> Self {
        Self {
            workers: num_cpus::get().clamp(1, DEFAULT_PARALLEL_WORKERS),
            default_profile: None,
            delimiter: None,
            sheet: None,
            default_unit: None,
            profiles: Vec::new(),
        }
    }
}

impl ImporterConfig {
    /// Default location of the configuration file
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Layered configuration sources without command-line overrides
    ///
    /// A missing configuration file contributes nothing.
    pub fn figment(config_file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(ImporterConfig::default()));

        match config_file {
            Some(path) => figment = figment.merge(Toml::file(path)),
            None => {
                if let Some(path) = Self::default_config_path() {
                    figment = figment.merge(Toml::file(path));
                }
            }
        }

        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Load and validate the configuration
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        if let Some(path) = config_file {
            if !path.exists() {
                return Err(Error::configuration(format!(
                    "Config file does not exist: {}",
                    path.display()
                )));
            }
        }

        Self::from_figment(Self::figment(config_file))
    }

    /// Extract and validate a configuration from arbitrary sources
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: ImporterConfig = figment.extract()?;
        config.validate()?;
        debug!(
            "Configuration loaded: {} workers, {} custom profiles",
            config.workers,
            config.profiles.len()
        );
        Ok(config)
    }

    /// Override the worker count
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Override the default profile
    pub fn with_default_profile(mut self, name: impl Into<String>) -> Self {
        self.default_profile = Some(name.into());
        self
    }

    /// Override the delimiter
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Override the worksheet selector
    pub fn with_sheet(mut self, sheet: SheetSelector) -> Self {
        self.sheet = Some(sheet);
        self
    }

    /// Override the default unit
    pub fn with_default_unit(mut self, unit: Unit) -> Self {
        self.default_unit = Some(unit);
        self
    }

    /// Check configuration consistency
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(Error::configuration(
                "Number of workers must be greater than 0",
            ));
        }

        if let Some(delimiter) = self.delimiter {
            if !delimiter.is_ascii() {
                return Err(Error::configuration(format!(
                    "Delimiter '{}' must be a single ASCII character",
                    delimiter
                )));
            }
        }

        let mut seen = HashSet::new();
        for profile in &self.profiles {
            if !seen.insert(profile.name.as_str()) {
                return Err(Error::configuration(format!(
                    "Duplicate instrument profile '{}'",
                    profile.name
                )));
            }
            profile.validate()?;
        }

        Ok(())
    }

    /// Every available profile; configured profiles shadow built-ins of the same name
    pub fn available_profiles(&self) -> Vec<InstrumentProfile> {
        let mut profiles: Vec<InstrumentProfile> = builtin_profiles()
            .into_iter()
            .filter(|builtin| !self.profiles.iter().any(|p| p.name == builtin.name))
            .collect();
        profiles.extend(self.profiles.iter().cloned());
        profiles
    }

    /// True when a configured profile shadows or extends the built-ins under this name
    pub fn is_custom_profile(&self, name: &str) -> bool {
        self.profiles.iter().any(|profile| profile.name == name)
    }

    /// Resolve the profile to parse with, applying configuration overrides
    pub fn resolve_profile(&self, name: Option<&str>) -> Result<InstrumentProfile> {
        let name = name
            .or(self.default_profile.as_deref())
            .ok_or_else(|| {
                Error::configuration("No instrument profile given and no default_profile configured")
            })?;

        let mut profile = self
            .available_profiles()
            .into_iter()
            .find(|profile| profile.name == name)
            .ok_or_else(|| Error::unknown_profile(name))?;

        if let Some(delimiter) = self.delimiter {
            profile = profile.with_delimiter(delimiter);
        }
        if let Some(sheet) = &self.sheet {
            profile = profile.with_sheet(sheet.clone());
        }
        if let Some(unit) = self.default_unit {
            profile = profile.with_default_unit(unit);
        }

        profile.validate()?;
        debug!("Resolved instrument profile '{}'", profile.name);
        Ok(profile)
    }
}
