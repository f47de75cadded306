//! Shared cache probe
//!
//! Accelerator nodes may have a cluster-wide cache fileset mounted from a
//! parallel filesystem. Such mounts come and go at runtime, so the probe is
//! re-run on every lookup, and since a stuck parallel filesystem can hang
//! `stat(2)` indefinitely it runs on a blocking worker under a timeout.

use crate::config::schema::{ClusterMount, SharedCacheConfig};
use crate::error::{LocatorError, LocatorResult};
use crate::hostfs::{HostFs, HostRoot};
use crate::root_volume::is_on_root_filesystem;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// Hostname-gated probe for a pre-provisioned shared cache directory
#[derive(Clone)]
pub struct SharedCacheProbe {
    fs: Arc<dyn HostFs>,
    host_root: HostRoot,
    enabled: bool,
    hostname_prefix: String,
    clusters: Vec<ClusterMount>,
    timeout: Duration,
}

impl SharedCacheProbe {
    /// Create a probe from configuration
    pub fn new(fs: Arc<dyn HostFs>, host_root: HostRoot, config: &SharedCacheConfig) -> Self {
        Self {
            fs,
            host_root,
            enabled: config.enabled,
            hostname_prefix: config.hostname_prefix.clone(),
            clusters: config.clusters.clone(),
            timeout: Duration::from_secs(config.probe_timeout_secs),
        }
    }

    /// Override the probe timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Probe for a shared cache path, giving up after the timeout
    ///
    /// Returns the path in host path-space. A timed-out worker keeps
    /// running in the background and its result is dropped.
    pub async fn probe(&self) -> Option<String> {
        if !self.enabled {
            return None;
        }
        match self.probe_with_timeout().await {
            Ok(path) => path,
            Err(e) => {
                warn!("{}; is the shared filesystem hung?", e);
                None
            }
        }
    }

    async fn probe_with_timeout(&self) -> LocatorResult<Option<String>> {
        let (tx, rx) = oneshot::channel();
        let worker = self.clone();
        tokio::task::spawn_blocking(move || {
            // The receiver is gone once the caller timed out
            let _ = tx.send(worker.probe_blocking());
        });

        match tokio::time::timeout(self.timeout, rx).await {
            Ok(Ok(path)) => Ok(path),
            Ok(Err(_)) => Err(LocatorError::Internal(
                "shared cache probe worker exited without a result".to_string(),
            )),
            Err(_) => Err(LocatorError::ProbeTimeout {
                probe: "shared cache",
                timeout: self.timeout,
            }),
        }
    }

    /// Walk the cluster list synchronously; first eligible entry wins
    pub fn probe_blocking(&self) -> Option<String> {
        let hostname = match self.fs.hostname() {
            Ok(h) => h,
            Err(e) => {
                warn!("{}", LocatorError::Hostname(e));
                return None;
            }
        };
        if !hostname.starts_with(&self.hostname_prefix) {
            debug!(
                "Hostname {:?} does not start with {:?}",
                hostname, self.hostname_prefix
            );
            return None;
        }

        self.clusters
            .iter()
            .find(|cluster| self.is_eligible(cluster, &hostname))
            .map(|cluster| cluster.path.clone())
    }

    fn is_eligible(&self, cluster: &ClusterMount, hostname: &str) -> bool {
        let container_path = self.host_root.container_path(&cluster.path);
        match self.fs.stat(&container_path) {
            Err(e) if e.kind() == io::ErrorKind::NotFound && !hostname.contains(&cluster.label) => {
                debug!("Path {:?} not present: {}", container_path, e);
                false
            }
            Err(e) => {
                warn!("Error stating path {:?}: {}", container_path, e);
                false
            }
            Ok(st) if !st.is_dir => {
                warn!("Path is not a directory: {:?}", container_path);
                false
            }
            Ok(_) if is_on_root_filesystem(self.fs.as_ref(), &container_path) => {
                warn!("Path {:?} is in root volume", container_path);
                false
            }
            Ok(_) => true,
        }
    }
}
