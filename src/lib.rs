//! cache-locator - cache directory selection for containerized storage clients
//!
//! Picks a dedicated NVMe volume from the host's block devices, prefers a
//! cluster-wide shared cache fileset when one is mounted, and otherwise
//! falls back to a safe default. Nothing here ever writes to a candidate
//! directory; it only decides which one to use.

pub mod cli;
pub mod config;
pub mod device;
pub mod error;
pub mod gauge;
pub mod hostfs;
pub mod locator;
pub mod logging;
pub mod root_volume;
pub mod selector;
pub mod shared_cache;

pub use error::{LocatorError, LocatorResult};
pub use locator::{CacheDirLocator, CacheSelection};
