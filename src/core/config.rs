use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::error::ReportError;

pub const ENV_USE_TEAMS_POST: &str = "USE_TEAMS_POST";
pub const ENV_TEAMS_WEBHOOK_URL: &str = "TEAMS_WEBHOOK_URL";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeamsSettings {
    pub enabled: Option<bool>,
    pub webhook_url: Option<String>,
}

/// On-disk config file. Every key is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub teams: TeamsSettings,
}

impl FileConfig {
    /// Get the config file path, respecting XDG_CONFIG_HOME
    pub fn default_path() -> PathBuf {
        let config_dir = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("~"))
                    .join(".config")
            });
        config_dir.join("aws-cost-report").join("config.toml")
    }

    /// Load the config file, falling back to defaults if it does not exist
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }
}

/// Settings for one run, resolved once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportConfig {
    pub use_teams_post: bool,
    pub teams_webhook_url: Option<String>,
}

impl ReportConfig {
    /// Layer environment variables (looked up through `env`) over the file.
    ///
    /// `USE_TEAMS_POST` enables posting only when it equals "yes" (any case).
    /// An empty `TEAMS_WEBHOOK_URL` counts as unset.
    pub fn resolve(file: FileConfig, env: impl Fn(&str) -> Option<String>) -> Self {
        let use_teams_post = match env(ENV_USE_TEAMS_POST) {
            Some(v) => v.eq_ignore_ascii_case("yes"),
            None => file.teams.enabled.unwrap_or(false),
        };
        let teams_webhook_url = env(ENV_TEAMS_WEBHOOK_URL)
            .or(file.teams.webhook_url)
            .filter(|url| !url.trim().is_empty());

        Self {
            use_teams_post,
            teams_webhook_url,
        }
    }

    /// Read the config file (default path unless `path` is given) and the
    /// process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(p) => FileConfig::load(p)?,
            None => FileConfig::load(&FileConfig::default_path())?,
        };
        Ok(Self::resolve(file, |key| std::env::var(key).ok()))
    }

    /// Posting needs a webhook URL.
    pub fn validate(&self) -> Result<(), ReportError> {
        if self.use_teams_post && self.teams_webhook_url.is_none() {
            return Err(ReportError::Config(format!(
                "{ENV_TEAMS_WEBHOOK_URL} is not set in the environment variables."
            )));
        }
        Ok(())
    }
}
