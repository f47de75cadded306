//! Block device tree as reported by `lsblk --json`

use crate::device::size::parse_size;
use crate::error::{LocatorError, LocatorResult};
use crate::hostfs::HostFs;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

/// A node in the host's block device tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    /// Kernel device name (diagnostic only)
    #[serde(default)]
    pub name: String,

    /// Device category: disk, part, raid0, lvm, ...
    #[serde(rename = "type", default)]
    pub kind: String,

    /// Human-readable capacity, e.g. `3.5T`
    #[serde(default, deserialize_with = "null_as_default")]
    pub size: String,

    /// Transport label, e.g. `nvme` or `sata`
    #[serde(rename = "tran", default)]
    pub transport: Option<String>,

    /// Where this node is mounted
    #[serde(default)]
    pub mountpoint: Option<String>,

    /// Newer lsblk releases report every mountpoint in an array instead
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub mountpoints: Vec<Option<String>>,

    /// Partitions of a disk or arrays built on top of it
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub children: Vec<Device>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Device {
    /// Transport label, if known
    pub fn transport(&self) -> Option<&str> {
        self.transport.as_deref().filter(|t| !t.is_empty())
    }

    /// Whether the device reports the NVMe transport
    pub fn is_nvme(&self) -> bool {
        self.transport() == Some("nvme")
    }

    /// Mountpoint of this node itself, ignoring children
    pub fn mountpoint(&self) -> Option<&str> {
        self.mountpoint
            .as_deref()
            .or_else(|| self.mountpoints.iter().flatten().map(String::as_str).next())
            .filter(|mp| !mp.is_empty())
    }

    /// Capacity in bytes; 0 when the size is missing or unparseable
    pub fn byte_size(&self) -> u64 {
        if self.size.is_empty() {
            return 0;
        }
        match parse_size(&self.size) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Error parsing size {:?} of {}: {}", self.size, self.name, e);
                0
            }
        }
    }

    /// Whether the mountpoint exists and is a directory
    pub fn is_statable_dir(&self, fs: &dyn HostFs) -> bool {
        let Some(mountpoint) = self.mountpoint() else {
            return false;
        };
        match fs.stat(Path::new(mountpoint)) {
            Ok(st) if st.is_dir => true,
            Ok(_) => {
                warn!("Mountpoint is not a directory: {:?}", mountpoint);
                false
            }
            Err(e) => {
                warn!("Error stating mountpoint {:?}: {}", mountpoint, e);
                false
            }
        }
    }

    /// The mountpoint that represents this device
    ///
    /// A mounted node answers with its own mountpoint. Otherwise the largest
    /// statable child wins, with later children winning ties.
    pub fn effective_mountpoint(&self, fs: &dyn HostFs) -> Option<&str> {
        if let Some(mountpoint) = self.mountpoint() {
            return Some(mountpoint);
        }

        let mut largest: Option<&Device> = None;
        for child in &self.children {
            let bigger = largest.map_or(true, |l| child.byte_size() >= l.byte_size());
            if bigger && child.is_statable_dir(fs) {
                largest = Some(child);
            }
        }
        largest.and_then(Device::mountpoint)
    }
}

/// One snapshot of the host's block devices
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceListing {
    /// Root devices in the order lsblk reported them
    #[serde(rename = "blockdevices", default)]
    pub devices: Vec<Device>,
}

impl DeviceListing {
    /// Parse the JSON report of `lsblk --json`
    pub fn from_json(output: &[u8]) -> LocatorResult<Self> {
        serde_json::from_slice(output).map_err(LocatorError::ListingParse)
    }

    /// Every device in the tree, depth first, with its nesting depth
    pub fn walk(&self) -> Vec<(usize, &Device)> {
        fn visit<'a>(device: &'a Device, depth: usize, out: &mut Vec<(usize, &'a Device)>) {
            out.push((depth, device));
            for child in &device.children {
                visit(child, depth + 1, out);
            }
        }

        let mut out = Vec::new();
        for device in &self.devices {
            visit(device, 0, &mut out);
        }
        out
    }
}
