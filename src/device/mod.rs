//! Host block device model
//!
//! Parses the JSON report of `lsblk` into a device tree and derives the
//! size and mountpoint facts the selector ranks candidates by.

pub mod lister;
pub mod model;
pub mod size;

pub use lister::{DeviceLister, FileLister, LsblkLister, LSBLK_COLUMNS};
pub use model::{Device, DeviceListing};
pub use size::{parse_size, SizeParseError};
