//! Cache directory selection
//!
//! [`CacheDirLocator`] answers "which directory should the cache live in
//! right now". A shared cache fileset wins whenever one is reachable;
//! otherwise the answer is whatever local NVMe volume the one-time startup
//! discovery found, or the compiled-in default until it has.
//!
//! # Startup
//!
//! | Task | When | Effect |
//! |------|------|--------|
//! | discovery | immediately | runs lsblk once, may publish an NVMe path |
//! | publish | after the publish delay | sets the gauge, warns if discovery hangs |
//!
//! Neither task is ever awaited by lookups; callers simply see the default
//! until discovery publishes.

use crate::config::Config;
use crate::device::DeviceLister;
use crate::gauge::CacheDirGauge;
use crate::hostfs::{HostFs, HostRoot};
use crate::selector::NvmeSelector;
use crate::shared_cache::SharedCacheProbe;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// The published local cache directory
///
/// Starts at the default and accepts exactly one discovery result.
/// Readers always see a whole value.
pub struct CacheSelection {
    current: watch::Sender<PathBuf>,
    discovered: AtomicBool,
}

impl CacheSelection {
    /// Create a selection holding `default`
    pub fn new(default: PathBuf) -> Self {
        let (current, _) = watch::channel(default);
        Self {
            current,
            discovered: AtomicBool::new(false),
        }
    }

    /// The directory currently in effect
    pub fn current(&self) -> PathBuf {
        self.current.borrow().clone()
    }

    /// Replace the default with a discovered directory
    ///
    /// Returns `false` if a discovery result was already published.
    pub fn publish_discovered(&self, dir: PathBuf) -> bool {
        if self
            .discovered
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }
        self.current.send_replace(dir);
        true
    }

    /// Watch for the discovered directory
    pub fn subscribe(&self) -> watch::Receiver<PathBuf> {
        self.current.subscribe()
    }
}

/// Handles to the detached startup tasks
pub struct StartupTasks {
    pub discovery: JoinHandle<()>,
    pub publish: JoinHandle<()>,
}

impl StartupTasks {
    /// Cancel whichever startup tasks are still running
    ///
    /// A hung lsblk child keeps running; only the task awaiting it stops.
    pub fn abort(&self) {
        self.discovery.abort();
        self.publish.abort();
    }
}

/// Decides the cache directory a storage client should use
pub struct CacheDirLocator {
    fs: Arc<dyn HostFs>,
    host_root: HostRoot,
    cache_subdir: String,
    publish_delay: Duration,
    selection: CacheSelection,
    shared: SharedCacheProbe,
    discovery_done: watch::Sender<bool>,
}

impl CacheDirLocator {
    /// Create a locator; nothing is probed until [`start`](Self::start)
    pub fn new(config: &Config, fs: Arc<dyn HostFs>) -> Self {
        let host_root = HostRoot::new(config.discovery.host_root.clone());
        let shared = SharedCacheProbe::new(Arc::clone(&fs), host_root.clone(), &config.shared_cache);
        let (discovery_done, _) = watch::channel(false);

        Self {
            fs,
            host_root,
            cache_subdir: config.discovery.cache_subdir.clone(),
            publish_delay: Duration::from_secs(config.discovery.publish_delay_secs),
            selection: CacheSelection::new(PathBuf::from(&config.discovery.default_dir)),
            shared,
            discovery_done,
        }
    }

    /// The published local selection
    pub fn selection(&self) -> &CacheSelection {
        &self.selection
    }

    fn cache_dir(&self, volume: &str) -> PathBuf {
        Path::new(volume).join(&self.cache_subdir)
    }

    /// Cache directories to use right now; always exactly one
    pub async fn local_cache_dirs(&self) -> Vec<PathBuf> {
        // Shared filesets can be mounted or unmounted at any time
        if let Some(path) = self.shared.probe().await {
            let dir = self.cache_dir(&path);
            info!("Use shared cache path: {}", dir.display());
            return vec![dir];
        }
        vec![self.selection.current()]
    }

    /// Run lsblk and publish the selected NVMe volume, if any
    ///
    /// Returns the cache directory found on it. Failures are logged and
    /// leave the selection untouched.
    pub async fn discover_nvme(&self, lister: &dyn DeviceLister) -> Option<PathBuf> {
        let output = match lister.list().await {
            Ok(output) => output,
            Err(e) => {
                warn!("Error executing {}: {}", lister.describe(), e);
                return None;
            }
        };

        let fs = Arc::clone(&self.fs);
        let host_root = self.host_root.clone();
        let selected = tokio::task::spawn_blocking(move || {
            let selected = NvmeSelector::new(fs.as_ref(), &host_root).select_from_output(&output);
            if selected.is_none() {
                info!(
                    "NVMe mountpoint not found from lsblk output: {:?}",
                    String::from_utf8_lossy(&output)
                );
            }
            selected
        })
        .await;

        let mountpoint = match selected {
            Ok(mountpoint) => mountpoint?,
            Err(e) => {
                warn!("NVMe selection task failed: {}", e);
                return None;
            }
        };

        info!("Found NVMe mountpoint: {:?}", mountpoint);
        let dir = self.cache_dir(&mountpoint);
        if !self.selection.publish_discovered(dir.clone()) {
            warn!(
                "Cache directory already discovered, ignoring {}",
                dir.display()
            );
        }
        Some(dir)
    }

    /// Full startup discovery: NVMe first, then a shared cache availability check
    async fn run_discovery(&self, lister: &dyn DeviceLister) {
        self.discover_nvme(lister).await;
        if let Some(path) = self.shared.probe().await {
            info!("Shared cache path: {:?} available", path);
        }
        self.discovery_done.send_replace(true);
    }

    /// Whether startup discovery has completed
    pub fn discovery_finished(&self) -> bool {
        *self.discovery_done.borrow()
    }

    /// Wait up to `timeout` for startup discovery; `true` if it completed
    pub async fn wait_for_discovery(&self, timeout: Duration) -> bool {
        let mut done = self.discovery_done.subscribe();
        let waited = tokio::time::timeout(timeout, done.wait_for(|finished| *finished)).await;
        matches!(waited, Ok(Ok(_)))
    }

    /// Spawn the one-time discovery task
    pub fn spawn_discovery(self: &Arc<Self>, lister: Arc<dyn DeviceLister>) -> JoinHandle<()> {
        let locator = Arc::clone(self);
        tokio::spawn(async move { locator.run_discovery(lister.as_ref()).await })
    }

    /// Spawn the delayed gauge publication task
    pub fn spawn_publish(self: &Arc<Self>, gauge: Arc<dyn CacheDirGauge>) -> JoinHandle<()> {
        let locator = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(locator.publish_delay).await;
            if !locator.discovery_finished() {
                warn!(
                    "NVMe probe did not finish in {:?}, is lsblk hung?",
                    locator.publish_delay
                );
            }
            if let Some(dir) = locator.local_cache_dirs().await.first() {
                gauge.set(dir);
            }
        })
    }

    /// Start discovery and the delayed gauge publication
    pub fn start(
        self: &Arc<Self>,
        lister: Arc<dyn DeviceLister>,
        gauge: Arc<dyn CacheDirGauge>,
    ) -> StartupTasks {
        StartupTasks {
            discovery: self.spawn_discovery(lister),
            publish: self.spawn_publish(gauge),
        }
    }
}
