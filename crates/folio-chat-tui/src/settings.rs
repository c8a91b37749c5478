use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};

/// Front-end settings read from `<config dir>/folio-chat/settings.json`.
///
/// Every field is optional; command-line flags win over the file.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Settings {
    pub storage_path: Option<PathBuf>,
    pub endpoint: Option<String>,
    pub log_file: Option<PathBuf>,
}

impl Settings {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_settings_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&content)?;
        Ok(settings)
    }

    /// Applies command-line overrides on top of the file values.
    pub fn merge(self, storage_path: Option<PathBuf>, endpoint: Option<String>, log_file: Option<PathBuf>) -> Self {
        Self {
            storage_path: storage_path.or(self.storage_path),
            endpoint: endpoint.or(self.endpoint),
            log_file: log_file.or(self.log_file),
        }
    }

    pub fn log_file_or_default(&self) -> Result<PathBuf> {
        match &self.log_file {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::app_dir()?.join("folio-chat.log")),
        }
    }

    fn get_settings_path() -> Result<PathBuf> {
        Ok(Self::app_dir()?.join("settings.json"))
    }

    fn app_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("folio-chat"))
    }
}
