//! CLI command implementations

pub mod config;
pub mod devices;
pub mod monitor;
pub mod resolve;
pub mod shared;

pub use config::execute as config;
pub use devices::execute as devices;
pub use monitor::execute as monitor;
pub use resolve::execute as resolve;
pub use shared::execute as shared;

use crate::config::Config;
use crate::device::{DeviceLister, FileLister, LsblkLister};
use std::path::PathBuf;
use std::sync::Arc;

/// The lister selected by a `--listing` option
fn lister_for(listing: Option<PathBuf>, config: &Config) -> Arc<dyn DeviceLister> {
    match listing {
        Some(path) => Arc::new(FileLister::new(path)),
        None => Arc::new(LsblkLister::new(config.discovery.lsblk_command.clone())),
    }
}
