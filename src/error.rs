//! Error types for cache-locator
//!
//! All fallible modules use `LocatorResult<T>` as their return type. The
//! locator itself never surfaces these to callers; it logs them and falls
//! back to the default cache directory.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for cache-locator operations
pub type LocatorResult<T> = Result<T, LocatorError>;

/// All errors that can occur in cache-locator
#[derive(Error, Debug)]
pub enum LocatorError {
    // Device listing errors
    #[error("Command failed: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command execution error: {command}, stderr: {stderr}")]
    CommandExecution { command: String, stderr: String },

    #[error("Malformed device listing: {0}")]
    ListingParse(#[source] serde_json::Error),

    // Probe errors
    #[error("Failed to read hostname: {0}")]
    Hostname(#[source] std::io::Error),

    #[error("{probe} probe did not finish within {timeout:?}")]
    ProbeTimeout { probe: &'static str, timeout: Duration },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LocatorError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Create a command execution error
    pub fn command_exec(command: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::CommandExecution {
            command: command.into(),
            stderr: stderr.into(),
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::CommandFailed { .. } => {
                Some("Install util-linux or set discovery.lsblk_command in the config")
            }
            Self::ConfigInvalid { .. } => Some("Run: cache-locator config init --force"),
            _ => None,
        }
    }
}
