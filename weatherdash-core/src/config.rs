use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

/// City used when nothing else is configured or location lookup fails.
pub const FALLBACK_LOCATION: &str = "London";

pub const DEFAULT_GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
pub const DEFAULT_FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Daily commute used for the carbon savings estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommuteConfig {
    pub bike_km: f64,
    pub walk_km: f64,
}

impl Default for CommuteConfig {
    fn default() -> Self {
        Self {
            bike_km: 5.0,
            walk_km: 2.0,
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// default_location = "Lisbon"
///
/// [commute]
/// bike_km = 8.5
/// walk_km = 1.0
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// City shown when none is given on the command line.
    pub default_location: Option<String>,

    /// Override for the Open-Meteo geocoding endpoint.
    pub geocoding_url: Option<String>,

    /// Override for the Open-Meteo forecast endpoint.
    pub forecast_url: Option<String>,

    pub commute: CommuteConfig,
}

impl Config {
    pub fn default_location(&self) -> &str {
        self.default_location
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(FALLBACK_LOCATION)
    }

    pub fn set_default_location(&mut self, location: &str) -> Result<()> {
        let location = location.trim();
        if location.is_empty() {
            return Err(anyhow!("Please enter a city name"));
        }

        self.default_location = Some(location.to_string());
        Ok(())
    }

    pub fn set_commute(&mut self, bike_km: f64, walk_km: f64) -> Result<()> {
        for (mode, km) in [("bike", bike_km), ("walk", walk_km)] {
            if !km.is_finite() || km < 0.0 {
                return Err(anyhow!(
                    "Invalid {mode} distance {km}: expected a non-negative number of kilometres"
                ));
            }
        }

        self.commute = CommuteConfig { bike_km, walk_km };
        Ok(())
    }

    pub fn geocoding_url(&self) -> &str {
        self.geocoding_url.as_deref().unwrap_or(DEFAULT_GEOCODING_URL)
    }

    pub fn forecast_url(&self) -> &str {
        self.forecast_url.as_deref().unwrap_or(DEFAULT_FORECAST_URL)
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let cfg: Config = toml::from_str(contents)?;
        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weatherdash", "weatherdash")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
