//! Configuration file (`config.toml`)
//!
//! Looked up at `$FOLIO_CONFIG`, else `<config dir>/folio/config.toml`.
//! A missing file means defaults.

use anyhow::{Context, Result};
use folio_history::HistoryConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "FOLIO_CONFIG";

/// Complete configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FolioConfig {
    pub history: HistoryConfig,
    pub editor: EditorConfig,
}

/// Save-path settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Strip carriage returns from saved text
    pub unix_eol: bool,
    /// User recorded when `--user` is not given
    pub default_user: String,
    /// Address recorded when `--ip` is not given
    pub default_ip: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            unix_eol: true,
            default_user: String::new(),
            default_ip: "127.0.0.1".to_string(),
        }
    }
}

impl FolioConfig {
    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        self.history.validate().map_err(anyhow::Error::msg)?;
        if self.editor.default_ip.trim().is_empty() {
            anyhow::bail!("editor.default_ip must not be empty");
        }
        Ok(())
    }
}

/// Location of the config file
pub fn config_file_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }
    dirs::config_dir().map(|dir| dir.join("folio").join("config.toml"))
}

/// Load the config file, or defaults if there is none
pub fn load() -> Result<FolioConfig> {
    match config_file_path() {
        Some(path) => load_from(&path),
        None => Ok(FolioConfig::default()),
    }
}

pub fn load_from(path: &Path) -> Result<FolioConfig> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(FolioConfig::default()),
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read config {}", path.display()))
        }
    };
    let config: FolioConfig = toml::from_str(&raw)
        .with_context(|| format!("Failed to parse config {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("Invalid configuration in {}", path.display()))?;
    Ok(config)
}

/// Write the config file, creating its directory
pub fn save(config: &FolioConfig) -> Result<()> {
    let path = config_file_path().context("Could not determine config file path")?;
    save_to(config, &path)
}

pub fn save_to(config: &FolioConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let text = toml::to_string_pretty(config).context("Failed to serialize config")?;
    std::fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))
}

/// Create the config file with defaults if it does not exist
pub fn init_if_missing() -> Result<PathBuf> {
    let path = config_file_path().context("Could not determine config file path")?;
    if !path.exists() {
        save_to(&FolioConfig::default(), &path)?;
    }
    Ok(path)
}
