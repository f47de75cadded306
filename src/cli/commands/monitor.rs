//! Monitor command - run the locator the way a long-lived client does

use crate::cli::args::MonitorArgs;
use crate::config::Config;
use crate::device::LsblkLister;
use crate::error::{LocatorError, LocatorResult};
use crate::gauge::TracingGauge;
use crate::hostfs::RealHostFs;
use crate::locator::CacheDirLocator;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Execute the monitor command
pub async fn execute(args: MonitorArgs, config: &Config) -> LocatorResult<()> {
    let locator = Arc::new(CacheDirLocator::new(config, Arc::new(RealHostFs::new())));
    let lister = Arc::new(LsblkLister::new(config.discovery.lsblk_command.clone()));
    let mut published = locator.selection().subscribe();
    let tasks = locator.start(lister, Arc::new(TracingGauge));

    let mut ticker = tokio::time::interval(Duration::from_secs(args.interval.max(1)));
    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                tasks.abort();
                signal.map_err(|e| LocatorError::io("waiting for Ctrl-C", e))?;
                info!("Interrupted, exiting");
                return Ok(());
            }
            Ok(()) = published.changed() => {
                let dir = published.borrow_and_update().clone();
                info!("Local cache dir discovered: {}", dir.display());
            }
            _ = ticker.tick() => {
                for dir in locator.local_cache_dirs().await {
                    info!(
                        discovered = locator.discovery_finished(),
                        "Current cache dir: {}",
                        dir.display()
                    );
                }
            }
        }
    }
}
