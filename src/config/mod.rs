//! Configuration loading and persistence
//!
//! The file is optional: a missing file means every section takes its
//! defaults, so a fresh node needs no setup before `resolve` works.

pub mod schema;

pub use schema::Config;

use crate::error::{LocatorError, LocatorResult};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Reads and writes the TOML config at a fixed location
#[derive(Debug, Clone)]
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    /// Manager for the per-user config under the platform config dir
    pub fn new() -> Self {
        Self::with_path(Self::default_config_path())
    }

    /// Manager for an explicit file, e.g. from `--config`
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// `<config dir>/cache-locator/config.toml`, or relative to `.` when the
    /// platform has no config dir
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("cache-locator")
            .join("config.toml")
    }

    /// Parse the config file; a missing file yields [`Config::default`]
    pub async fn load(&self) -> LocatorResult<Config> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No config at {}, using defaults", self.path.display());
                return Ok(Config::default());
            }
            Err(e) => {
                return Err(LocatorError::io(
                    format!("reading config from {}", self.path.display()),
                    e,
                ))
            }
        };

        toml::from_str(&content).map_err(|e| LocatorError::ConfigInvalid {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    /// Write `config` out, creating the parent directory as needed
    pub async fn save(&self, config: &Config) -> LocatorResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|source| LocatorError::ConfigDirCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let content = toml::to_string_pretty(config)?;
        fs::write(&self.path, content)
            .await
            .map_err(|e| LocatorError::io(format!("writing config to {}", self.path.display()), e))?;

        info!("Wrote config to {}", self.path.display());
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
