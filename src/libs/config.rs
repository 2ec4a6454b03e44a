//! Application configuration.
//!
//! The configuration lives in `config.json` inside the per-user data
//! directory (see [`DataStorage`]). A missing file is not an error; every
//! field has a default so a fresh installation works without any setup.
//!
//! ```json
//! {
//!   "timezone": "Europe/Berlin",
//!   "snapshot_retention_days": 7,
//!   "report": { "round": true, "separator": "newline" },
//!   "default_billable": false
//! }
//! ```

use super::data_storage::DataStorage;
use crate::libs::clock::parse_zone;
use crate::libs::report::Separator;
use anyhow::Result;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "config.json";

/// Defaults applied to summaries when the command line does not override them.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ReportConfig {
    /// Round note groups to the nearest quarter hour.
    pub round: bool,
    pub separator: Separator,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            round: true,
            separator: Separator::Newline,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Config {
    /// IANA zone used for wall-clock projections.
    pub timezone: String,

    /// Explicit database location. Falls back to the data directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<PathBuf>,

    /// How long snapshots taken before a migration are kept.
    pub snapshot_retention_days: i64,

    pub report: ReportConfig,

    /// Billable flag given to projects created without an explicit one.
    pub default_billable: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            timezone: "UTC".to_string(),
            database: None,
            snapshot_retention_days: 7,
            report: ReportConfig::default(),
            default_billable: false,
        }
    }
}

impl Config {
    /// Loads the configuration, falling back to defaults when no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn read() -> Result<Config> {
        Config::read_from(&DataStorage::new().get_path(CONFIG_FILE_NAME)?)
    }

    pub fn read_from(config_file_path: &Path) -> Result<Config> {
        if !config_file_path.exists() {
            return Ok(Config::default());
        }

        let config_str = fs::read_to_string(config_file_path)?;
        let config: Config = serde_json::from_str(&config_str)?;
        Ok(config)
    }

    /// Writes the configuration as pretty-printed JSON.
    pub fn save(&self) -> Result<()> {
        self.save_to(&DataStorage::new().get_path(CONFIG_FILE_NAME)?)
    }

    pub fn save_to(&self, config_file_path: &Path) -> Result<()> {
        let config_file = File::create(config_file_path)?;
        serde_json::to_writer_pretty(&config_file, &self)?;
        Ok(())
    }

    /// The configured zone, validated.
    pub fn zone(&self) -> Result<Tz> {
        Ok(parse_zone(&self.timezone)?)
    }

    pub fn snapshot_retention(&self) -> chrono::Duration {
        chrono::Duration::days(self.snapshot_retention_days.max(0))
    }
}
