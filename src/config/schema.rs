//! Configuration schema for cache-locator
//!
//! Configuration is stored at `~/.config/cache-locator/config.toml`. Every
//! field has a default, so an empty or missing file behaves exactly like
//! the compiled-in settings.

use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Local NVMe discovery settings
    pub discovery: DiscoveryConfig,

    /// Shared cache probe settings
    pub shared_cache: SharedCacheConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// Local cache directory discovery
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Where the host root is mounted inside the container
    pub host_root: String,

    /// Cache directory used when nothing better is found
    pub default_dir: String,

    /// Sub-directory appended to a discovered volume
    pub cache_subdir: String,

    /// lsblk program to run
    pub lsblk_command: String,

    /// Seconds after startup at which the selection is published
    pub publish_delay_secs: u64,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            host_root: "/.host".to_string(),
            default_dir: "/var/jfsCache".to_string(),
            cache_subdir: "jfsCache".to_string(),
            lsblk_command: "lsblk".to_string(),
            publish_delay_secs: 60,
        }
    }
}

/// One cluster's shared cache fileset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterMount {
    /// Cluster label, expected as a substring of its nodes' hostnames
    pub label: String,

    /// Absolute path of the fileset on the host
    pub path: String,
}

impl ClusterMount {
    /// Create a cluster mount entry
    pub fn new(label: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            path: path.into(),
        }
    }
}

/// Shared cache probe settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SharedCacheConfig {
    /// Probe for shared caches at all
    pub enabled: bool,

    /// Only hosts whose name starts with this prefix are probed
    pub hostname_prefix: String,

    /// Give up on a probe after this many seconds
    pub probe_timeout_secs: u64,

    /// Candidate filesets, in priority order
    pub clusters: Vec<ClusterMount>,
}

impl Default for SharedCacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            hostname_prefix: "gpu-".to_string(),
            probe_timeout_secs: 30,
            clusters: vec![
                ClusterMount::new(
                    "basemind",
                    "/gpfs/public-shared/fileset-groups/basemind-sys-jfs",
                ),
                ClusterMount::new(
                    "shaipower",
                    "/inspurfs/public-shared/fileset-projects/sys-jfs",
                ),
            ],
        }
    }
}
