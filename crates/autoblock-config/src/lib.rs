//! autoblock-config: Loading and saving the user's schedule configuration.
//!
//! The config file lives at `~/.autoblock/config.json` and keeps the
//! kebab-case key format of the original tool. It is parsed with json5 so a
//! hand-edited file may carry comments and trailing commas.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use autoblock_types::BlockSchedule;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Json5(#[from] json5::Error),
    #[error("home directory not found")]
    NoDirFound,
    #[error("no config file at {0}; run `autoblock config` to create one")]
    NotFound(PathBuf),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level configuration, mirroring the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// macOS account the block runs for.
    pub username: String,
    /// Absolute path to SelfControl.app.
    pub selfcontrol_path: PathBuf,
    /// Weekly block windows.
    pub block_schedules: Vec<BlockSchedule>,
    /// Hosts to block in every window that has no list of its own.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_blacklist: Option<Vec<String>>,
    /// Write BlockStartedDate ourselves; needed by old SelfControl releases.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legacy_mode: Option<bool>,
}

impl Config {
    /// Structural checks that touch nothing outside the value itself.
    /// Environment checks (does the user exist, is SelfControl.app there)
    /// belong to activation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.username.is_empty() {
            return Err(ConfigError::Invalid(
                "'username' must be set; use your macOS username (see `whoami`)".into(),
            ));
        }
        if self.selfcontrol_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "'selfcontrol-path' must point to SelfControl.app, \
                 e.g. /Applications/SelfControl.app"
                    .into(),
            ));
        }
        if self.block_schedules.is_empty() {
            return Err(ConfigError::Invalid(
                "'block-schedules' needs at least one entry".into(),
            ));
        }
        if self.host_blacklist.is_none()
            && self.block_schedules.iter().all(|s| s.host_blacklist.is_none())
        {
            tracing::warn!(
                "no host-blacklist configured; SelfControl will reuse whatever list it last stored"
            );
        }
        Ok(())
    }
}

/// Resolve the autoblock config directory (`~/.autoblock`).
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    dirs::home_dir()
        .map(|h| h.join(".autoblock"))
        .ok_or(ConfigError::NoDirFound)
}

/// Resolve the config file path (`~/.autoblock/config.json`).
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.json"))
}

/// Load and validate the configuration from the default path.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_file_path()?)
}

/// Load and validate the configuration from a specific path.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path)?;
    let config: Config = json5::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Ensure the config directory exists.
pub fn ensure_config_dir() -> Result<PathBuf, ConfigError> {
    let dir = config_dir()?;
    if !dir.exists() {
        std::fs::create_dir_all(&dir)?;
    }
    Ok(dir)
}

/// Save configuration to the default path.
pub fn save_config(config: &Config) -> Result<PathBuf, ConfigError> {
    let dir = ensure_config_dir()?;
    let path = dir.join("config.json");
    let content = serde_json::to_string_pretty(config)
        .map_err(|e| ConfigError::Io(std::io::Error::other(e)))?;
    std::fs::write(&path, content)?;
    Ok(path)
}

/// Starter configuration written by `autoblock config` when none exists.
pub const SAMPLE_CONFIG: &str = r#"{
    "username": "your-username",
    "selfcontrol-path": "/Applications/SelfControl.app",
    "host-blacklist": [
        "twitter.com",
        "reddit.com",
        "news.ycombinator.com"
    ],
    "block-schedules": [
        { "weekday": 1, "start-hour": 9, "start-minute": 0, "end-hour": 17, "end-minute": 30 },
        { "start-hour": 22, "start-minute": 0, "end-hour": 6, "end-minute": 0 }
    ]
}
"#;
