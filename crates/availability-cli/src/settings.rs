//! Scheduling settings for the `slots` CLI.
//!
//! ## Loading order
//! 1. Built-in defaults (09:00-17:00 Mon-Fri in `Asia/Kolkata`, 60 minute
//!    meetings, 15 minute buffer, at most 10 slots and 3 alternatives)
//! 2. A TOML file: `--config <path>`, else the first of [`CONFIG_CANDIDATES`]
//!    that exists
//! 3. Environment variables (a `.env` file is loaded beforehand by `main`)
//!
//! ## Environment Variables
//! - `SLOTS_TIMEZONE`: IANA timezone of the working-hours window
//! - `SLOTS_WORK_START` / `SLOTS_WORK_END`: local hours, 0-23
//! - `SLOTS_WORK_DAYS`: comma-separated weekdays, e.g. `Mon,Tue,Wed`
//! - `SLOTS_DEFAULT_DURATION`: meeting length in minutes
//! - `SLOTS_BUFFER_MINUTES`: break kept clear around meetings
//! - `SLOTS_MAX_SLOTS`: cap on slots returned (0 = no cap)
//! - `SLOTS_MAX_ALTERNATIVES`: alternatives suggested for a conflict

use std::path::{Path, PathBuf};
use std::str::FromStr;

use availability_engine::{AvailabilityError, WorkingHoursWindow};
use chrono::Weekday;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Files probed, relative to the working directory, when `--config` is absent.
pub const CONFIG_CANDIDATES: [&str; 2] = ["slots.toml", "config/slots.toml"];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid value for {key}: '{value}'")]
    Env { key: String, value: String },

    #[error("Unknown weekday: '{0}'")]
    Weekday(String),

    #[error(transparent)]
    Window(#[from] AvailabilityError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub timezone: String,
    pub working_hours: WorkingHoursSettings,
    pub scheduling: SchedulingSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkingHoursSettings {
    pub start: u32,
    pub end: u32,
    pub days: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchedulingSettings {
    pub default_duration_minutes: i64,
    pub buffer_minutes: i64,
    pub max_slots: usize,
    pub max_alternatives: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timezone: "Asia/Kolkata".to_string(),
            working_hours: WorkingHoursSettings::default(),
            scheduling: SchedulingSettings::default(),
        }
    }
}

impl Default for WorkingHoursSettings {
    fn default() -> Self {
        Self {
            start: 9,
            end: 17,
            days: ["Mon", "Tue", "Wed", "Thu", "Fri"]
                .iter()
                .map(|d| d.to_string())
                .collect(),
        }
    }
}

impl Default for SchedulingSettings {
    fn default() -> Self {
        Self {
            default_duration_minutes: 60,
            buffer_minutes: 15,
            max_slots: 10,
            max_alternatives: 3,
        }
    }
}

impl Settings {
    /// Load defaults, then the config file, then environment overrides.
    ///
    /// # Errors
    /// Returns `ConfigError` if an explicit file is missing, a file cannot be
    /// read or parsed, or an environment variable holds an invalid value.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(p) if !p.exists() => return Err(ConfigError::NotFound(p.to_path_buf())),
            Some(p) => Some(p.to_path_buf()),
            None => probe_config_paths(),
        };

        let mut settings = match path {
            Some(path) => Self::from_file(&path)?,
            None => {
                tracing::debug!("no config file found, using defaults");
                Self::default()
            }
        };
        settings.apply_env(|key| std::env::var(key).ok())?;
        Ok(settings)
    }

    /// # Errors
    /// Returns `ConfigError::Read` or `ConfigError::Parse`.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        tracing::info!(path = %path.display(), "loading settings");
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply `SLOTS_*` overrides from `lookup`.
    ///
    /// # Errors
    /// Returns `ConfigError::Env` for values that do not parse.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(tz) = lookup("SLOTS_TIMEZONE") {
            self.timezone = tz;
        }
        if let Some(days) = lookup("SLOTS_WORK_DAYS") {
            self.working_hours.days = days
                .split(',')
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string)
                .collect();
        }
        override_parsed(&lookup, "SLOTS_WORK_START", &mut self.working_hours.start)?;
        override_parsed(&lookup, "SLOTS_WORK_END", &mut self.working_hours.end)?;
        override_parsed(
            &lookup,
            "SLOTS_DEFAULT_DURATION",
            &mut self.scheduling.default_duration_minutes,
        )?;
        override_parsed(&lookup, "SLOTS_BUFFER_MINUTES", &mut self.scheduling.buffer_minutes)?;
        override_parsed(&lookup, "SLOTS_MAX_SLOTS", &mut self.scheduling.max_slots)?;
        override_parsed(
            &lookup,
            "SLOTS_MAX_ALTERNATIVES",
            &mut self.scheduling.max_alternatives,
        )?;
        Ok(())
    }

    /// Validate the settings into a working-hours window.
    ///
    /// # Errors
    /// Returns `ConfigError::Weekday` for unknown day names and
    /// `ConfigError::Window` for a bad timezone or hour range.
    pub fn window(&self) -> Result<WorkingHoursWindow, ConfigError> {
        let days = self
            .working_hours
            .days
            .iter()
            .map(|d| Weekday::from_str(d).map_err(|_| ConfigError::Weekday(d.clone())))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(WorkingHoursWindow::from_parts(
            self.working_hours.start,
            self.working_hours.end,
            &self.timezone,
            &days,
        )?)
    }
}

fn override_parsed<F, T>(lookup: &F, key: &str, target: &mut T) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    if let Some(value) = lookup(key) {
        *target = value.trim().parse().map_err(|_| ConfigError::Env {
            key: key.to_string(),
            value,
        })?;
    }
    Ok(())
}

/// First existing file among [`CONFIG_CANDIDATES`] in the working directory.
pub fn probe_config_paths() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    CONFIG_CANDIDATES
        .iter()
        .map(|name| cwd.join(name))
        .find(|path| path.exists())
}
