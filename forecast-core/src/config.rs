use anyhow::{Context, Result, anyhow, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs, io,
    path::{Path, PathBuf},
    str::FromStr,
};

use crate::model::{ForecastDays, ForecastRequest};

/// Where the forecast is fetched for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationConfig {
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: String,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            latitude: 49.922,
            longitude: 14.446,
            timezone: "Europe/Berlin".to_string(),
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// default_days = 3
///
/// [location]
/// latitude = 49.922
/// longitude = 14.446
/// timezone = "Europe/Berlin"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Days shown by `forecast show` when `--days` is not given.
    pub default_days: Option<u8>,

    /// Override for the Open-Meteo endpoint, mostly useful for testing.
    pub base_url: Option<String>,

    #[serde(default)]
    pub location: LocationConfig,
}

impl Config {
    /// Config from the platform config file; defaults until one is saved.
    pub fn load() -> Result<Self> {
        Self::read_from(&Self::config_file_path()?)
    }

    /// Reads `path`. A missing file is an empty config, anything else that
    /// goes wrong is an error.
    pub fn read_from(path: &Path) -> Result<Self> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(e).with_context(|| format!("Cannot read config {}", path.display()));
            }
        };

        Self::from_toml(&contents)
            .with_context(|| format!("Invalid forecast config in {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Cannot encode forecast config as TOML")
    }

    /// Writes the platform config file and returns where it went.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.write_to(&path)?;
        Ok(path)
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Cannot create config directory {}", dir.display()))?;
        }

        fs::write(path, self.to_toml()?)
            .with_context(|| format!("Cannot write config {}", path.display()))
    }

    pub fn config_file_path() -> Result<PathBuf> {
        ProjectDirs::from("dev", "home-weather", "forecast-cli")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .ok_or_else(|| anyhow!("No config directory for this platform"))
    }

    pub fn set_location(&mut self, latitude: f64, longitude: f64, timezone: String) {
        self.location = LocationConfig {
            latitude,
            longitude,
            timezone,
        };
    }

    /// Configured default days, falling back to a full week.
    pub fn default_days(&self) -> Result<ForecastDays> {
        match self.default_days {
            Some(days) => ForecastDays::try_from(i64::from(days)).map_err(|e| {
                anyhow!("Invalid default_days in config: {e}.\nHint: run `forecast configure`.")
            }),
            None => Ok(ForecastDays::default()),
        }
    }

    pub fn forecast_request(&self) -> ForecastRequest {
        ForecastRequest {
            latitude: self.location.latitude,
            longitude: self.location.longitude,
            timezone: self.location.timezone.clone(),
        }
    }
}

/// A "longitude,latitude" pair as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub longitude: f64,
    pub latitude: f64,
}

impl FromStr for Coordinates {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (lon, lat) = s
            .split_once(',')
            .ok_or_else(|| anyhow!("Invalid coordinates '{s}', expected 'longitude,latitude'"))?;

        if lat.contains(',') {
            bail!("Invalid coordinates '{s}', expected exactly two values");
        }

        let longitude: f64 = lon
            .trim()
            .parse()
            .with_context(|| format!("Invalid longitude in '{s}'"))?;
        let latitude: f64 = lat
            .trim()
            .parse()
            .with_context(|| format!("Invalid latitude in '{s}'"))?;

        if !(-180.0..=180.0).contains(&longitude) {
            bail!("Longitude {longitude} out of range (-180 to 180)");
        }
        if !(-90.0..=90.0).contains(&latitude) {
            bail!("Latitude {latitude} out of range (-90 to 90)");
        }

        Ok(Self {
            longitude,
            latitude,
        })
    }
}
