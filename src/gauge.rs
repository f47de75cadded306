//! Publication of the selected cache directory as a gauge

use std::path::Path;
use tracing::info;

/// Name of the gauge carrying the selected path as its label
pub const CACHE_DIR_GAUGE: &str = "cache_dir_path";

/// Log target of gauge events, enabled regardless of verbosity
pub const GAUGE_TARGET: &str = "cache_locator::gauge";

/// Sink for the one-shot `cache_dir_path{path=...} 1` gauge
pub trait CacheDirGauge: Send + Sync {
    /// Record `path` as the cache directory in effect
    fn set(&self, path: &Path);
}

/// Emits the gauge as a structured log event for log-based scrapers
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingGauge;

impl CacheDirGauge for TracingGauge {
    fn set(&self, path: &Path) {
        info!(
            target: GAUGE_TARGET,
            metric = CACHE_DIR_GAUGE,
            path = %path.display(),
            value = 1,
            "Cache dir path on host"
        );
    }
}
