//! Root volume overlap detection
//!
//! A path bind-mounted from the root filesystem looks like separate storage
//! by name only. Comparing device ids catches it.

use crate::hostfs::HostFs;
use std::path::Path;
use tracing::warn;

/// Whether `path` lives on the same device as `/`
///
/// Fails closed: any stat error reports `false`.
pub fn is_on_root_filesystem(fs: &dyn HostFs, path: &Path) -> bool {
    let dir = match fs.stat(path) {
        Ok(st) => st,
        Err(e) => {
            warn!("Stat {:?}: {}", path, e);
            return false;
        }
    };
    let root = match fs.stat(Path::new("/")) {
        Ok(st) => st,
        Err(e) => {
            warn!("Stat \"/\": {}", e);
            return false;
        }
    };
    dir.dev == root.dev
}
