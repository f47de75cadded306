//! Resolve command - print the cache directory to use

use super::lister_for;
use crate::cli::args::{OutputFormat, ResolveArgs};
use crate::config::Config;
use crate::error::LocatorResult;
use crate::hostfs::RealHostFs;
use crate::locator::CacheDirLocator;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Execute the resolve command
pub async fn execute(args: ResolveArgs, config: &Config) -> LocatorResult<()> {
    let locator = Arc::new(CacheDirLocator::new(config, Arc::new(RealHostFs::new())));
    locator.spawn_discovery(lister_for(args.listing, config));

    if !locator
        .wait_for_discovery(Duration::from_secs(args.wait))
        .await
    {
        warn!(
            "Device discovery did not finish within {}s, answering with the current selection",
            args.wait
        );
    }

    let dirs = locator.local_cache_dirs().await;
    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&dirs)?),
        OutputFormat::Table | OutputFormat::Plain => {
            for dir in &dirs {
                println!("{}", dir.display());
            }
        }
    }

    Ok(())
}
