//! TOML-based application configuration.
//!
//! Stores monitoring and planning preferences:
//! - Poll cadence and simulation noise for live runs
//! - Optional fixed seed for reproducible sessions
//! - Default cycle count and display offset for planning
//!
//! Configuration is stored at `~/.config/earlybird/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::planner::{CyclePlanner, PlannerConfig};
use crate::simulation::{SimulationConfig, StageSimulator};

/// Returns `~/.config/earlybird[-dev]/` based on EARLYBIRD_ENV.
///
/// Set EARLYBIRD_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("EARLYBIRD_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("earlybird-dev")
    } else {
        base_dir.join("earlybird")
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::SaveFailed {
        path: dir.clone(),
        message: e.to_string(),
    })?;
    Ok(dir)
}

/// Monitoring loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Seconds between polls in a live run (1-3600)
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Probability that a reading ignores the schedule (0.0-1.0)
    #[serde(default = "default_noise_probability")]
    pub noise_probability: f64,

    /// Fixed random seed (None = random)
    #[serde(default)]
    pub seed: Option<u64>,
}

// Default functions
fn default_poll_interval_secs() -> u64 {
    5
}
fn default_noise_probability() -> f64 {
    StageSimulator::DEFAULT_NOISE_PROBABILITY
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            noise_probability: default_noise_probability(),
            seed: None,
        }
    }
}

impl MonitorConfig {
    /// Simulation config for a tracker driven by these settings.
    pub fn simulation(&self) -> SimulationConfig {
        SimulationConfig {
            noise_probability: self.noise_probability,
            seed: self.seed,
        }
    }
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/earlybird/config.toml`. Missing
/// keys fall back to defaults so partial files load cleanly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub planner: PlannerConfig,
}

impl Config {
    /// Known dotted keys for `get`/`set`.
    pub const KEYS: [&'static str; 5] = [
        "monitor.poll_interval_secs",
        "monitor.noise_probability",
        "monitor.seed",
        "planner.default_cycles",
        "planner.timezone_offset_hours",
    ];

    /// Absolute path of the active config file.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk, writing the default file on first run.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed or
    /// holds out-of-range values, or if the default cannot be written.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let cfg: Config =
                    toml::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// Load from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let cfg: Config =
            toml::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Save to an explicit path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns the first out-of-range value found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=3600).contains(&self.monitor.poll_interval_secs) {
            return Err(ConfigError::InvalidValue {
                key: "monitor.poll_interval_secs".to_string(),
                message: format!(
                    "must be within 1-3600, got {}",
                    self.monitor.poll_interval_secs
                ),
            });
        }
        self.monitor.simulation().validate()?;
        if !(CyclePlanner::MIN_CYCLES..=CyclePlanner::MAX_CYCLES)
            .contains(&self.planner.default_cycles)
        {
            return Err(ConfigError::InvalidValue {
                key: "planner.default_cycles".to_string(),
                message: format!(
                    "must be within {}-{}, got {}",
                    CyclePlanner::MIN_CYCLES,
                    CyclePlanner::MAX_CYCLES,
                    self.planner.default_cycles
                ),
            });
        }
        if !(-12..=14).contains(&self.planner.timezone_offset_hours) {
            return Err(ConfigError::InvalidValue {
                key: "planner.timezone_offset_hours".to_string(),
                message: format!(
                    "must be within -12-14, got {}",
                    self.planner.timezone_offset_hours
                ),
            });
        }
        Ok(())
    }

    /// Get a config value as string by dotted key.
    ///
    /// # Errors
    ///
    /// Returns an error for keys not listed in [`Config::KEYS`].
    pub fn get(&self, key: &str) -> Result<String, ConfigError> {
        let value = match key {
            "monitor.poll_interval_secs" => self.monitor.poll_interval_secs.to_string(),
            "monitor.noise_probability" => self.monitor.noise_probability.to_string(),
            "monitor.seed" => match self.monitor.seed {
                Some(seed) => seed.to_string(),
                None => "none".to_string(),
            },
            "planner.default_cycles" => self.planner.default_cycles.to_string(),
            "planner.timezone_offset_hours" => self.planner.timezone_offset_hours.to_string(),
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        };
        Ok(value)
    }

    /// Set a config value by dotted key and re-validate.
    ///
    /// `monitor.seed` accepts `none` to clear the seed. The change is not
    /// persisted; call [`Config::save`] afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown keys, unparsable values, or values that
    /// fail validation.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "monitor.poll_interval_secs" => {
                self.monitor.poll_interval_secs = parse_value(key, value)?
            }
            "monitor.noise_probability" => self.monitor.noise_probability = parse_value(key, value)?,
            "monitor.seed" => {
                self.monitor.seed = if value == "none" {
                    None
                } else {
                    Some(parse_value(key, value)?)
                };
            }
            "planner.default_cycles" => self.planner.default_cycles = parse_value(key, value)?,
            "planner.timezone_offset_hours" => {
                self.planner.timezone_offset_hours = parse_value(key, value)?
            }
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        self.validate()
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        message: e.to_string(),
    })
}
