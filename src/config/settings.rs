//! Application settings loaded from config.toml
//!
//! Every section is optional: a missing file section (or a missing file, see
//! [`load_config_or_default`](crate::config::settings::load_config_or_default)) falls back to the defaults below, which match the
//! conventions the audit viewer and reports expect.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::env::VarError;
use std::path::Path;
use tracing::{debug, warn};

/// Environment variable that overrides the configuration file location
pub const CONFIG_PATH_ENV: &str = "HOTEL_INVENTORY_CONFIG";

/// Default configuration file, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Database location
    pub database: DatabaseSettings,
    /// Locale conventions used when rendering values for people
    pub display: DisplaySettings,
    /// Recent-search list behaviour
    pub search: SearchSettings,
    /// Maintenance reporting window
    pub maintenance: MaintenanceSettings,
}

/// `[database]` section
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct DatabaseSettings {
    /// `SeaORM` connection string; `DATABASE_URL` takes precedence
    pub url: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: "sqlite://data/hotel_inventory.sqlite?mode=rwc".to_string(),
        }
    }
}

/// `[display]` section
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct DisplaySettings {
    /// Symbol placed before currency amounts (e.g. `$`, `R$`)
    pub currency_symbol: String,
    /// Separator between a currency symbol and the amount
    pub currency_spacing: String,
    /// Decimal separator
    pub decimal_separator: String,
    /// Thousands separator
    pub thousands_separator: String,
    /// Word placed between the date and the time of a timestamp
    pub date_time_connector: String,
    /// Offset applied to stored UTC timestamps before display
    pub utc_offset_minutes: i32,
    /// Rendered in place of absent values
    pub placeholder: String,
    /// Label for a present attachment
    pub attached_label: String,
    /// Label for a missing attachment
    pub not_attached_label: String,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            currency_symbol: "$".to_string(),
            currency_spacing: String::new(),
            decimal_separator: ".".to_string(),
            thousands_separator: ",".to_string(),
            date_time_connector: "at".to_string(),
            utc_offset_minutes: 0,
            placeholder: "-".to_string(),
            attached_label: "Attached".to_string(),
            not_attached_label: "Not attached".to_string(),
        }
    }
}

/// `[search]` section
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct SearchSettings {
    /// How many recent searches are kept
    pub history_limit: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self { history_limit: 10 }
    }
}

/// `[maintenance]` section
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct MaintenanceSettings {
    /// Items due within this many days count as upcoming in the summary
    pub upcoming_window_days: i64,
}

impl Default for MaintenanceSettings {
    fn default() -> Self {
        Self {
            upcoming_window_days: 30,
        }
    }
}

/// Loads the application configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - A field has the wrong type
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref)?;

    parse_config(&contents)
}

/// Parses configuration from TOML text
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads the configuration from `HOTEL_INVENTORY_CONFIG` (or ./config.toml),
/// falling back to defaults when the file does not exist.
///
/// A file that exists but cannot be parsed is still an error, and so is a
/// `HOTEL_INVENTORY_CONFIG` value that is not valid unicode.
pub fn load_config_or_default() -> Result<AppConfig> {
    let path = match std::env::var(CONFIG_PATH_ENV) {
        Ok(path) => path,
        Err(VarError::NotPresent) => DEFAULT_CONFIG_PATH.to_string(),
        Err(e) => return Err(e.into()),
    };

    if !Path::new(&path).exists() {
        warn!("No configuration file at {path}, using defaults");
        return Ok(AppConfig::default());
    }

    load_config(&path)
}
