//! Run configuration: built-in defaults, overridden by a TOML file,
//! overridden by command line flags (applied by the binary).

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

pub const LOCAL_CONFIG_FILE: &str = "dlstats.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Galaxy role whose downloads are tracked.
    pub role: String,
    /// Program used to query Galaxy.
    pub galaxy_command: String,
    /// Series store.
    pub data_file: PathBuf,
    /// Where charts and the status page are written.
    pub output_dir: PathBuf,
    /// Length of the daily chart window, ending today.
    pub window_days: u32,
    pub page_title: String,
    /// Page description. Derived from `window_days` when unset.
    pub description: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            role: "marcinpraczko.goss-install".to_string(),
            galaxy_command: "ansible-galaxy".to_string(),
            data_file: PathBuf::from("data/download_counts.json"),
            output_dir: PathBuf::from("docs"),
            window_days: 30,
            page_title: "Download Statistics".to_string(),
            description: None,
        }
    }
}

impl Config {
    /// `<config dir>/dlstats/config.toml`, if the platform has a config dir.
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("dlstats").join("config.toml"))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// An explicit path must exist. Otherwise `./dlstats.toml`, then the
    /// global config file, then the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            return Self::from_file(&local);
        }
        if let Some(global) = Self::global_config_path().filter(|p| p.exists()) {
            return Self::from_file(&global);
        }
        Ok(Self::default())
    }

    pub fn validate(&self) -> Result<()> {
        if self.role.trim().is_empty() {
            return Err(anyhow!("`role` must not be empty"));
        }
        if self.galaxy_command.trim().is_empty() {
            return Err(anyhow!("`galaxy_command` must not be empty"));
        }
        if self.window_days == 0 {
            return Err(anyhow!("`window_days` must be at least 1"));
        }
        Ok(())
    }

    pub fn description(&self) -> String {
        self.description
            .clone()
            .unwrap_or_else(|| format!("Download Counts for the Last {} Days", self.window_days))
    }
}
