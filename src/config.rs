//! Configuration for argument handling and the monitor window.
//!
//! Every field has a default, so an empty file (or no file) is a valid setup.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

use crate::error::{Error, Result};

/// What to do with an argument of the wrong type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgumentPolicy {
    /// Substitute the documented default.
    #[default]
    Permissive,
    /// Fail the call with `Error::InvalidArgument`. Missing arguments still
    /// take the default.
    Strict,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub arguments: ArgumentConfig,

    #[serde(default)]
    pub monitor: MonitorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArgumentConfig {
    #[serde(default)]
    pub policy: ArgumentPolicy,

    /// Used by `usleep` when no usable duration is passed
    #[serde(default = "default_sleep_micros")]
    pub default_sleep_micros: i64,

    /// Used by `set_priority` when no usable priority is passed
    #[serde(default = "default_priority")]
    pub default_priority: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// How often the monitor window re-runs every query
    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,

    /// Increment applied by the priority +/- buttons
    #[serde(default = "default_priority_step")]
    pub priority_step: i32,
}

impl Default for ArgumentConfig {
    fn default() -> Self {
        Self {
            policy: ArgumentPolicy::default(),
            default_sleep_micros: default_sleep_micros(),
            default_priority: default_priority(),
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            refresh_interval_ms: default_refresh_interval_ms(),
            priority_step: default_priority_step(),
        }
    }
}

fn default_sleep_micros() -> i64 {
    1
}

fn default_priority() -> i32 {
    0
}

fn default_refresh_interval_ms() -> u64 {
    1000
}

fn default_priority_step() -> i32 {
    1
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.arguments.default_sleep_micros < 1 {
            return Err(Error::Config(format!(
                "arguments.default_sleep_micros must be at least 1, got {}",
                self.arguments.default_sleep_micros
            )));
        }
        if self.monitor.refresh_interval_ms == 0 {
            return Err(Error::Config("monitor.refresh_interval_ms must be positive".into()));
        }
        if self.monitor.priority_step <= 0 {
            return Err(Error::Config(format!(
                "monitor.priority_step must be positive, got {}",
                self.monitor.priority_step
            )));
        }
        Ok(())
    }
}

pub fn parse_config(source: &str) -> Result<Config> {
    let config: Config = toml::from_str(source)?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let source = std::fs::read_to_string(path)?;
    parse_config(&source)
}

/// Load configuration from file or use defaults
pub fn load_config_or_default(path: Option<&Path>) -> Config {
    match path {
        Some(path) => match load_config(path) {
            Ok(config) => {
                info!("Loaded configuration from: {}", path.display());
                config
            }
            Err(e) => {
                warn!("Failed to load config from {}: {}. Using defaults.", path.display(), e);
                Config::default()
            }
        },
        None => {
            info!("No config file specified, using defaults");
            Config::default()
        }
    }
}
