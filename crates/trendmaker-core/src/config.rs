use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::ask::DEFAULT_ENDPOINT;
use crate::error::ConfigError;

pub const MIN_DASHBOARD_PERCENT: u16 = 20;
pub const MAX_DASHBOARD_PERCENT: u16 = 80;
pub const DEFAULT_DASHBOARD_PERCENT: u16 = 50;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub endpoint: String,
    pub theme: Theme,
    pub dashboard_percent: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            theme: Theme::default(),
            dashboard_percent: DEFAULT_DASHBOARD_PERCENT,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a config file; a missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path)?;
        let mut config: Config = serde_json::from_str(&content)?;
        config.dashboard_percent = clamp_dashboard_percent(config.dashboard_percent);
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("trendmaker").join("config.json"))
    }
}

pub fn clamp_dashboard_percent(percent: u16) -> u16 {
    percent.clamp(MIN_DASHBOARD_PERCENT, MAX_DASHBOARD_PERCENT)
}
