//! NVMe cache volume selection
//!
//! Picks one mountpoint out of a device listing: the largest statable
//! NVMe-backed mount. Roots are sorted by their effective mountpoint first,
//! so that among equal sizes the same device wins on every run.

use crate::device::{Device, DeviceListing};
use crate::hostfs::{HostFs, HostRoot};
use tracing::{debug, warn};

/// Selects the NVMe mountpoint to use as cache storage
pub struct NvmeSelector<'a> {
    fs: &'a dyn HostFs,
    host_root: &'a HostRoot,
}

impl<'a> NvmeSelector<'a> {
    /// Create a selector that stats through `fs`
    pub fn new(fs: &'a dyn HostFs, host_root: &'a HostRoot) -> Self {
        Self { fs, host_root }
    }

    /// Parse raw `lsblk --json` output and select from it
    pub fn select_from_output(&self, output: &[u8]) -> Option<String> {
        match DeviceListing::from_json(output) {
            Ok(listing) => self.select(&listing),
            Err(e) => {
                warn!("Error parsing lsblk output: {}", e);
                None
            }
        }
    }

    /// Select the best NVMe mountpoint, in host path-space
    pub fn select(&self, listing: &DeviceListing) -> Option<String> {
        let mut roots: Vec<(Option<&str>, &Device)> = listing
            .devices
            .iter()
            .map(|d| (d.effective_mountpoint(self.fs), d))
            .collect();
        roots.sort_by(|a, b| a.0.cmp(&b.0));

        let mut best: Option<&Device> = None;
        for (_, device) in roots {
            if !device.is_nvme() {
                continue;
            }
            self.consider(&mut best, device);
            // Arrays over NVMe members carry no transport label themselves
            for child in &device.children {
                self.consider(&mut best, child);
            }
        }

        let best = best?;
        let mountpoint = best.mountpoint()?;
        debug!("Selected {} mounted at {:?}", best.name, mountpoint);
        Some(self.host_root.strip(mountpoint))
    }

    /// Replace `best` when `candidate` is at least as large and usable
    fn consider<'d>(&self, best: &mut Option<&'d Device>, candidate: &'d Device) {
        if let Some(mountpoint) = candidate.mountpoint() {
            if self.host_root.is_host_root(mountpoint) {
                debug!("Skipping {}: mounted at the host root", candidate.name);
                return;
            }
        }
        let at_least_as_large = best.map_or(true, |b| candidate.byte_size() >= b.byte_size());
        if at_least_as_large && candidate.is_statable_dir(self.fs) {
            *best = Some(candidate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hostfs::fake::FakeHostFs;

    fn select(fs: &FakeHostFs, json: &str) -> Option<String> {
        let root = HostRoot::default();
        NvmeSelector::new(fs, &root).select_from_output(json.as_bytes())
    }

    #[test]
    fn no_nvme() {
        let fs = FakeHostFs::new("node")
            .with_dir("/boot", 2)
            .with_dir("/boot/efi", 3);
        let json = r#"{
           "blockdevices": [
              {"name":"sda", "type":"disk", "size":"1.8T", "tran":"sata", "mountpoint":null,
                 "children": [
                    {"name":"sda1", "type":"part", "size":"1M", "tran":null, "mountpoint":null},
                    {"name":"sda2", "type":"part", "size":"100M", "tran":null, "mountpoint":"/boot/efi"},
                    {"name":"sda3", "type":"part", "size":"1G", "tran":null, "mountpoint":"/boot"},
                    {"name":"sda4", "type":"part", "size":"1.8T", "tran":null, "mountpoint":"/"}
                 ]
              }
           ]
        }"#;
        assert_eq!(select(&fs, json), None);
    }

    #[test]
    fn raid_nvme() {
        let fs = FakeHostFs::new("node")
            .with_dir("/boot", 2)
            .with_dir("/boot/efi", 3)
            .with_dir("/data", 9);

        let member = |name: &str| {
            format!(
                r#"{{"name":"{name}", "type":"disk", "size":"3.5T", "tran":"nvme", "mountpoint":null,
                   "children": [
                      {{"name":"md127", "type":"raid0", "size":"41.9T", "tran":null, "mountpoint":"/data"}}
                   ]}}"#
            )
        };
        let mut devices = vec![r#"{"name":"sda", "type":"disk", "size":"447.1G", "tran":"sas", "mountpoint":null,
             "children": [
                {"name":"sda1", "type":"part", "size":"1M", "tran":null, "mountpoint":null},
                {"name":"sda2", "type":"part", "size":"100M", "tran":null, "mountpoint":"/boot/efi"},
                {"name":"sda3", "type":"part", "size":"1G", "tran":null, "mountpoint":"/boot"},
                {"name":"sda4", "type":"part", "size":"446G", "tran":null, "mountpoint":"/"}
             ]}"#
        .to_string()];
        for n in [0, 1, 10, 4, 6, 9, 8, 2, 11, 7, 3, 5] {
            devices.push(member(&format!("nvme{n}n1")));
        }
        let json = format!(r#"{{"blockdevices": [{}]}}"#, devices.join(","));

        assert_eq!(select(&fs, &json).as_deref(), Some("/data"));
    }

    #[test]
    fn container_nvme() {
        let fs = FakeHostFs::new("node").with_dir("/.host/data", 5);
        let json = r#"{
           "blockdevices": [
              {
                 "name": "nvme0n1",
                 "type": "disk",
                 "size": "1.7T",
                 "tran": "nvme",
                 "mountpoint": "/.host/data"
              }
           ]
        }"#;
        assert_eq!(select(&fs, json).as_deref(), Some("/data"));
    }

    #[test]
    fn avoid_root_volume() {
        let fs = FakeHostFs::new("node")
            .with_dir("/.host", 2)
            .with_dir("/.host/boot", 3)
            .with_dir("/.host/boot/efi", 4)
            .with_dir("/.host/mnt/nvme0n1", 5)
            .with_dir("/.host/mnt/nvme2n1", 6)
            .with_dir("/.host/mnt/nvme3n1", 7);
        let json = r#"{
           "blockdevices": [
              {"name":"nvme1n1", "type":"disk", "size":"3.5T", "tran":"nvme", "mountpoint":"/.host/mnt/nvme0n1"},
              {"name":"nvme3n1", "type":"disk", "size":"3.5T", "tran":"nvme", "mountpoint":"/.host/mnt/nvme3n1"},
              {"name":"nvme2n1", "type":"disk", "size":"3.5T", "tran":"nvme", "mountpoint":"/.host/mnt/nvme2n1"},
              {"name":"nvme4n1", "type":"disk", "size":"3.5T", "tran":"nvme", "mountpoint":null,
                 "children": [
                    {"name":"nvme4n1p1", "type":"part", "size":"1M", "tran":"nvme", "mountpoint":null},
                    {"name":"nvme4n1p2", "type":"part", "size":"100M", "tran":"nvme", "mountpoint":"/.host/boot/efi"},
                    {"name":"nvme4n1p3", "type":"part", "size":"1G", "tran":"nvme", "mountpoint":"/.host/boot"},
                    {"name":"nvme4n1p4", "type":"part", "size":"3.5T", "tran":"nvme", "mountpoint":"/.host"}
                 ]
              },
              {"name":"nvme0n1", "type":"disk", "size":"447.1G", "tran":"nvme", "mountpoint":null,
                 "children": [
                    {"name":"nvme0n1p1", "type":"part", "size":"1M", "tran":"nvme", "mountpoint":null},
                    {"name":"nvme0n1p2", "type":"part", "size":"100M", "tran":"nvme", "mountpoint":null},
                    {"name":"nvme0n1p3", "type":"part", "size":"1G", "tran":"nvme", "mountpoint":null},
                    {"name":"nvme0n1p4", "type":"part", "size":"446G", "tran":"nvme", "mountpoint":null}
                 ]
              }
           ]
        }"#;
        assert_eq!(select(&fs, json).as_deref(), Some("/mnt/nvme3n1"));
    }

    #[test]
    fn root_partition_alone_is_never_selected() {
        let fs = FakeHostFs::new("node").with_dir("/.host", 2);
        let json = r#"{"blockdevices": [
            {"name":"nvme0n1", "type":"disk", "size":"3.5T", "tran":"nvme", "mountpoint":null,
             "children": [
                {"name":"nvme0n1p1", "type":"part", "size":"3.5T", "tran":"nvme", "mountpoint":"/.host"}
             ]}
        ]}"#;
        assert_eq!(select(&fs, json), None);
    }

    #[test]
    fn equal_sizes_pick_last_mountpoint() {
        let fs = FakeHostFs::new("node")
            .with_dir("/mnt/b", 2)
            .with_dir("/mnt/c", 3)
            .with_dir("/mnt/a", 4);
        let json = r#"{"blockdevices": [
            {"name":"nvme0n1", "type":"disk", "size":"1T", "tran":"nvme", "mountpoint":"/mnt/b"},
            {"name":"nvme1n1", "type":"disk", "size":"1T", "tran":"nvme", "mountpoint":"/mnt/c"},
            {"name":"nvme2n1", "type":"disk", "size":"1T", "tran":"nvme", "mountpoint":"/mnt/a"}
        ]}"#;
        assert_eq!(select(&fs, json).as_deref(), Some("/mnt/c"));
    }

    #[test]
    fn larger_device_beats_later_mountpoint() {
        let fs = FakeHostFs::new("node")
            .with_dir("/mnt/a", 2)
            .with_dir("/mnt/z", 3);
        let json = r#"{"blockdevices": [
            {"name":"nvme0n1", "type":"disk", "size":"2T", "tran":"nvme", "mountpoint":"/mnt/a"},
            {"name":"nvme1n1", "type":"disk", "size":"1T", "tran":"nvme", "mountpoint":"/mnt/z"}
        ]}"#;
        assert_eq!(select(&fs, json).as_deref(), Some("/mnt/a"));
    }

    #[test]
    fn unstatable_mount_is_skipped() {
        let fs = FakeHostFs::new("node")
            .with_dir("/mnt/small", 2)
            .with_file("/mnt/file", 3);
        let json = r#"{"blockdevices": [
            {"name":"nvme0n1", "type":"disk", "size":"8T", "tran":"nvme", "mountpoint":"/mnt/gone"},
            {"name":"nvme1n1", "type":"disk", "size":"4T", "tran":"nvme", "mountpoint":"/mnt/file"},
            {"name":"nvme2n1", "type":"disk", "size":"1T", "tran":"nvme", "mountpoint":"/mnt/small"}
        ]}"#;
        assert_eq!(select(&fs, json).as_deref(), Some("/mnt/small"));
    }

    #[test]
    fn zero_size_statable_device_is_a_real_candidate() {
        let fs = FakeHostFs::new("node").with_dir("/mnt/unknown", 2);
        let json = r#"{"blockdevices": [
            {"name":"nvme0n1", "type":"disk", "size":null, "tran":"nvme", "mountpoint":"/mnt/unknown"}
        ]}"#;
        assert_eq!(select(&fs, json).as_deref(), Some("/mnt/unknown"));
    }

    #[test]
    fn empty_and_malformed_listings() {
        let fs = FakeHostFs::new("node");
        assert_eq!(select(&fs, r#"{"blockdevices": []}"#), None);
        assert_eq!(select(&fs, "{}"), None);
        assert_eq!(select(&fs, "not json"), None);
    }
}
