//! pmixer configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use pmixer_core::{Volume, VolumeLimits};
use serde::{Deserialize, Serialize};

/// pmixer configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// General settings
    #[serde(default)]
    pub general: GeneralConfig,
    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Volume step settings
    #[serde(default)]
    pub volume: VolumeConfig,
    /// Mutation reporting
    #[serde(default)]
    pub mutation: MutationConfig,
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Client name announced to the server
    #[serde(default = "default_client_name")]
    pub client_name: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            client_name: default_client_name(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_client_name() -> String {
    "pmixer".to_string()
}

/// Server settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ServerConfig {
    /// Server address (optional, uses the library default if not set)
    pub address: Option<String>,
}

/// Volume step settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeConfig {
    /// Step per inc/dec, in percent of normal volume
    #[serde(default = "default_step_percent")]
    pub step_percent: f64,
    /// Highest volume inc may reach, in percent (optional, UI maximum if not set)
    pub ceiling_percent: Option<f64>,
}

impl Default for VolumeConfig {
    fn default() -> Self {
        Self {
            step_percent: default_step_percent(),
            ceiling_percent: None,
        }
    }
}

fn default_step_percent() -> f64 {
    VolumeLimits::DEFAULT_STEP.percent()
}

impl VolumeConfig {
    /// Convert to volume limits.
    ///
    /// # Errors
    /// Returns an error if the step or ceiling is out of range.
    pub fn limits(&self) -> Result<VolumeLimits> {
        let step = Volume::from_percent(self.step_percent);
        let ceiling = self
            .ceiling_percent
            .map_or(VolumeLimits::DEFAULT_CEILING, Volume::from_percent);
        VolumeLimits::new(step, ceiling).context("Invalid [volume] settings")
    }
}

/// Mutation reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationConfig {
    /// Warn when the server rejects a change
    #[serde(default = "default_true")]
    pub warn_on_rejection: bool,
}

impl Default for MutationConfig {
    fn default() -> Self {
        Self { warn_on_rejection: true }
    }
}

fn default_true() -> bool {
    true
}

/// Where a loaded configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Read from this file
    File(PathBuf),
    /// No file at this path; built-in defaults
    Defaults(PathBuf),
}

/// Load configuration from `path`, the default location, or defaults.
///
/// Nothing is logged here, since logging is configured from the result.
pub fn load_config(path: Option<&Path>) -> Result<(Config, ConfigSource)> {
    let config_path = match path {
        Some(path) => path.to_path_buf(),
        None => config_path()?,
    };

    if config_path.exists() {
        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {config_path:?}"))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {config_path:?}"))?;
        Ok((config, ConfigSource::File(config_path)))
    } else {
        Ok((Config::default(), ConfigSource::Defaults(config_path)))
    }
}

/// Get the configuration file path.
fn config_path() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("nz", "dixon", "pmixer")
        .context("Could not determine config directory")?;
    Ok(dirs.config_dir().join("config.toml"))
}
