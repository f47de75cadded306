//! Host filesystem access
//!
//! Every stat and the hostname lookup made by the probes goes through
//! [`HostFs`], so selection logic can be exercised against an in-memory
//! host in tests.

use std::io;
use std::path::{Path, PathBuf};

/// The subset of file metadata the probes care about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    /// Whether the path is a directory
    pub is_dir: bool,
    /// ID of the device containing the file (`st_dev`)
    pub dev: u64,
}

/// Read-only view of the host the process runs on
pub trait HostFs: Send + Sync {
    /// Stat a path, following symlinks
    fn stat(&self, path: &Path) -> io::Result<FileStat>;

    /// The current hostname
    fn hostname(&self) -> io::Result<String>;
}

/// [`HostFs`] backed by the real filesystem and `gethostname(2)`
#[derive(Debug, Clone, Copy, Default)]
pub struct RealHostFs;

impl RealHostFs {
    /// Create a new real host view
    pub fn new() -> Self {
        Self
    }
}

impl HostFs for RealHostFs {
    fn stat(&self, path: &Path) -> io::Result<FileStat> {
        use std::os::unix::fs::MetadataExt;

        let meta = std::fs::metadata(path)?;
        Ok(FileStat {
            is_dir: meta.is_dir(),
            dev: meta.dev(),
        })
    }

    fn hostname(&self) -> io::Result<String> {
        let name = nix::unistd::gethostname()?;
        Ok(name.to_string_lossy().into_owned())
    }
}

/// Where the host's `/` is visible from inside the container
///
/// Paths returned to callers are always in host path-space, so anything
/// seen through the prefix has it stripped back off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostRoot {
    prefix: String,
}

impl HostRoot {
    /// Create a host root for the given prefix; `""` or `/` means none
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let prefix = prefix.trim_end_matches('/').to_string();
        Self { prefix }
    }

    /// The prefix, empty when the host root is the process root
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Translate a container-visible path back into host path-space
    ///
    /// `/.host/data` becomes `/data` and `/.host` becomes `/`; paths outside
    /// the prefix are returned unchanged.
    pub fn strip(&self, path: &str) -> String {
        if self.prefix.is_empty() {
            return path.to_string();
        }
        match path.strip_prefix(&self.prefix) {
            Some("") => "/".to_string(),
            Some(rest) if rest.starts_with('/') => rest.to_string(),
            _ => path.to_string(),
        }
    }

    /// Where a host path is visible from inside the container
    pub fn container_path(&self, host_path: &str) -> PathBuf {
        PathBuf::from(format!("{}{}", self.prefix, host_path))
    }

    /// Whether a container-visible path is the host's `/` itself
    pub fn is_host_root(&self, path: &str) -> bool {
        self.strip(path) == "/"
    }
}

impl Default for HostRoot {
    fn default() -> Self {
        Self::new("/.host")
    }
}

#[cfg(test)]
pub(crate) mod fake {
    //! In-memory host used by unit tests across the crate

    use super::{FileStat, HostFs};
    use std::collections::HashMap;
    use std::io;
    use std::path::{Path, PathBuf};
    use std::time::Duration;

    /// Device id the fake assigns to `/` unless overridden
    pub const ROOT_DEV: u64 = 1;

    #[derive(Debug, Default)]
    pub struct FakeHostFs {
        entries: HashMap<PathBuf, FileStat>,
        hostname: String,
        stat_delay: Option<Duration>,
    }

    impl FakeHostFs {
        pub fn new(hostname: &str) -> Self {
            let mut fs = Self {
                hostname: hostname.to_string(),
                ..Self::default()
            };
            fs.entries.insert(
                PathBuf::from("/"),
                FileStat {
                    is_dir: true,
                    dev: ROOT_DEV,
                },
            );
            fs
        }

        pub fn with_dir(mut self, path: &str, dev: u64) -> Self {
            self.entries
                .insert(PathBuf::from(path), FileStat { is_dir: true, dev });
            self
        }

        pub fn with_file(mut self, path: &str, dev: u64) -> Self {
            self.entries
                .insert(PathBuf::from(path), FileStat { is_dir: false, dev });
            self
        }

        /// Make every stat block the calling thread for `delay`
        pub fn with_stat_delay(mut self, delay: Duration) -> Self {
            self.stat_delay = Some(delay);
            self
        }
    }

    impl HostFs for FakeHostFs {
        fn stat(&self, path: &Path) -> io::Result<FileStat> {
            if let Some(delay) = self.stat_delay {
                std::thread::sleep(delay);
            }
            self.entries
                .get(path)
                .copied()
                .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
        }

        fn hostname(&self) -> io::Result<String> {
            Ok(self.hostname.clone())
        }
    }
}
