//! Runtime configuration.
//!
//! Values come from the environment (after `.env` is loaded by the binary)
//! and may be overridden by a JSON file:
//! ```json
//! {
//!   "data_dir": "/var/lib/fleetstat",
//!   "log_file_path": "/var/log/fleetstat/fleetstat.log"
//! }
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_LOG_FILE_PATH: &str = "logs/fleetstat.log";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Directory holding `vehicle_info.csv` and `trip_info.csv`.
    pub data_dir: PathBuf,
    pub log_file_path: PathBuf,
}

/// Fields a config file may set; anything missing keeps its current value.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    data_dir: Option<PathBuf>,
    log_file_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            log_file_path: PathBuf::from(DEFAULT_LOG_FILE_PATH),
        }
    }
}

impl AppConfig {
    /// Reads `FLEETSTAT_DATA_DIR` and `LOG_FILE_PATH`, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            data_dir: lookup("FLEETSTAT_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            log_file_path: lookup("LOG_FILE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.log_file_path),
        }
    }

    /// Applies overrides from the JSON file at `path`.
    pub fn merge_file(self, path: &str) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?;
        self.merge_json(&content)
            .with_context(|| format!("invalid config file {path}"))
    }

    fn merge_json(self, content: &str) -> Result<Self> {
        let file: FileConfig = serde_json::from_str(content)?;
        Ok(Self {
            data_dir: file.data_dir.unwrap_or(self.data_dir),
            log_file_path: file.log_file_path.unwrap_or(self.log_file_path),
        })
    }
}
