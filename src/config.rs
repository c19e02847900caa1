/// Classifier configuration.
///
/// Locations, the date window, the provider parameter list, and logging
/// options are loaded from a TOML file and handed to each run explicitly.
/// Environment variables (optionally from `.env`) override a few fields:
///
/// - `DROUGHT_CONFIG`   path to the TOML file (default `drought.toml`)
/// - `POWER_BASE_URL`   provider base URL
/// - `DROUGHT_LOG_FILE` append log entries to this file

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

use crate::logging::LogLevel;
use crate::model::{DroughtError, Parameter};

pub const DEFAULT_CONFIG_PATH: &str = "drought.toml";
pub const DEFAULT_POWER_BASE_URL: &str = "https://power.larc.nasa.gov";

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// A fixed geographic point to classify.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    /// WGS84 latitude.
    pub latitude: f64,
    /// WGS84 longitude.
    pub longitude: f64,
}

impl Location {
    /// Semi-arid reference point the scoring thresholds were tuned for.
    pub fn reference() -> Self {
        Self {
            name: "Hargeisa".to_string(),
            latitude: 9.5612,
            longitude: 44.0669,
        }
    }
}

/// Inclusive daily window ending at `end`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateWindow {
    pub end: NaiveDate,
    pub days: i64,
}

impl DateWindow {
    /// First day of the window. Errors if it falls outside the calendar range.
    pub fn start(&self) -> Result<NaiveDate, DroughtError> {
        Duration::try_days(self.days)
            .and_then(|d| self.end.checked_sub_signed(d))
            .ok_or_else(|| {
                DroughtError::Config(format!(
                    "window of {} days before {} is out of range",
                    self.days, self.end
                ))
            })
    }
}

impl Default for DateWindow {
    fn default() -> Self {
        Self {
            end: NaiveDate::from_ymd_opt(2025, 10, 1).unwrap_or_default(),
            days: 10_950,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub base_url: String,
    pub community: String,
    pub parameters: Vec<Parameter>,
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_POWER_BASE_URL.to_string(),
            community: "AG".to_string(),
            parameters: Parameter::PROVIDER_SET.to_vec(),
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub file: Option<String>,
    pub console_timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            file: None,
            console_timestamps: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Top-level configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub locations: Vec<Location>,
    pub window: DateWindow,
    pub provider: ProviderConfig,
    pub logging: LoggingConfig,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            locations: vec![Location::reference()],
            window: DateWindow::default(),
            provider: ProviderConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl ClassifierConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, DroughtError> {
        let config: ClassifierConfig =
            toml::from_str(text).map_err(|e| DroughtError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, DroughtError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| DroughtError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }

    /// Reads `.env`, loads `path` (or `$DROUGHT_CONFIG`, then `drought.toml`
    /// if present, else defaults) and applies environment overrides.
    pub fn load_from_env(path: Option<&Path>) -> Result<Self, DroughtError> {
        dotenv::dotenv().ok();

        let mut config = match (path, env::var("DROUGHT_CONFIG")) {
            (Some(path), _) => Self::load(path)?,
            (None, Ok(path)) => Self::load(Path::new(&path))?,
            (None, Err(_)) if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::load(Path::new(DEFAULT_CONFIG_PATH))?
            }
            (None, Err(_)) => Self::default(),
        };
        config.apply_env_overrides(|key| env::var(key).ok());
        Ok(config)
    }

    /// Applies `POWER_BASE_URL` and `DROUGHT_LOG_FILE` as returned by `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("POWER_BASE_URL") {
            self.provider.base_url = url;
        }
        if let Some(file) = lookup("DROUGHT_LOG_FILE") {
            self.logging.file = Some(file);
        }
    }

    pub fn find_location(&self, name: &str) -> Option<&Location> {
        self.locations
            .iter()
            .find(|l| l.name.eq_ignore_ascii_case(name))
    }

    fn validate(&self) -> Result<(), DroughtError> {
        if self.locations.is_empty() {
            return Err(DroughtError::Config("at least one [[locations]] entry is required".into()));
        }
        for l in &self.locations {
            if !(-90.0..=90.0).contains(&l.latitude) || !(-180.0..=180.0).contains(&l.longitude) {
                return Err(DroughtError::Config(format!(
                    "location '{}' has out-of-range coordinates ({}, {})",
                    l.name, l.latitude, l.longitude
                )));
            }
        }
        if self.window.days < 0 {
            return Err(DroughtError::Config("window.days must not be negative".into()));
        }
        self.window.start()?;
        if self.provider.parameters.is_empty() {
            return Err(DroughtError::Config("provider.parameters must not be empty".into()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
