use crate::fetch::FetchOptions;
use crate::installation::{default_distributions, Distribution, DEFAULT_EXECUTABLE};
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub root: Option<PathBuf>,

    #[serde(default = "default_executable")]
    pub executable: String,

    #[serde(default = "default_version_flag")]
    pub version_flag: String,

    #[serde(rename = "distribution")]
    pub distributions: Vec<Distribution>,

    pub download: DownloadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Whole-request timeout in seconds; `0` disables it.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_executable() -> String {
    DEFAULT_EXECUTABLE.to_string()
}
fn default_version_flag() -> String {
    "--version".to_string()
}
fn default_user_agent() -> String {
    FetchOptions::default().user_agent
}
fn default_timeout_secs() -> u64 {
    600
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl DownloadConfig {
    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            user_agent: self.user_agent.clone(),
            timeout: (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs)),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: None,
            executable: default_executable(),
            version_flag: default_version_flag(),
            distributions: Vec::new(),
            download: DownloadConfig::default(),
        }
    }
}

impl Config {
    /// Load from an explicit path, or the first config file found in the
    /// usual locations, or fall back to defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let config_path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => Self::find_config_path(),
        };
        match config_path {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    fn find_config_path() -> Option<PathBuf> {
        if let Some(xdg_config) = dirs::config_dir() {
            let xdg_path = xdg_config.join("esfetch/config.toml");
            if xdg_path.exists() {
                return Some(xdg_path);
            }
        }

        if let Some(home) = dirs::home_dir() {
            let home_path = home.join(".esfetch.toml");
            if home_path.exists() {
                return Some(home_path);
            }
        }

        let current_path = Path::new(".esfetch.toml");
        if current_path.exists() {
            return Some(current_path.to_path_buf());
        }

        None
    }

    /// Configured distributions, or the built-in list when none are set.
    pub fn distributions(&self) -> Vec<Distribution> {
        if self.distributions.is_empty() {
            default_distributions()
        } else {
            self.distributions.clone()
        }
    }

    /// `override_root` wins over the config file, which wins over `<home>/es`.
    pub fn resolve_root(&self, override_root: Option<&Path>) -> Result<PathBuf> {
        if let Some(root) = override_root {
            return Ok(root.to_path_buf());
        }
        if let Some(root) = &self.root {
            return Ok(root.clone());
        }
        dirs::home_dir()
            .map(|home| home.join("es"))
            .ok_or_else(|| anyhow!("cannot determine home directory"))
    }
}
