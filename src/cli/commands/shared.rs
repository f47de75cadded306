//! Shared command - probe for a shared cache fileset

use crate::config::Config;
use crate::error::LocatorResult;
use crate::hostfs::{HostFs, HostRoot, RealHostFs};
use crate::shared_cache::SharedCacheProbe;
use console::style;
use std::sync::Arc;

/// Execute the shared command
pub async fn execute(config: &Config) -> LocatorResult<()> {
    let fs = Arc::new(RealHostFs::new());
    let hostname = fs.hostname().unwrap_or_else(|_| "<unknown>".to_string());
    let probe = SharedCacheProbe::new(
        fs,
        HostRoot::new(config.discovery.host_root.clone()),
        &config.shared_cache,
    );

    println!("{} {}", style("Hostname:").bold(), hostname);
    if !config.shared_cache.enabled {
        println!("{}", style("Shared cache probing is disabled").yellow());
        return Ok(());
    }

    match probe.probe().await {
        Some(path) => println!(
            "{} {}",
            style("Shared cache:").bold(),
            style(path).green()
        ),
        None => println!("{}", style("No shared cache available").yellow()),
    }

    Ok(())
}
