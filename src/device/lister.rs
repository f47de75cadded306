//! Sources of raw block device listings
//!
//! The locator only ever sees the raw JSON bytes; where they come from is
//! behind [`DeviceLister`].

use crate::error::{LocatorError, LocatorResult};
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Columns requested from lsblk; the device model reads exactly these
pub const LSBLK_COLUMNS: &str = "NAME,TYPE,SIZE,TRAN,MOUNTPOINT";

/// Produces the raw JSON report of the host's block devices
#[async_trait]
pub trait DeviceLister: Send + Sync {
    /// Capture one listing snapshot
    async fn list(&self) -> LocatorResult<Vec<u8>>;

    /// Human-readable description of the source for logs
    fn describe(&self) -> String;
}

/// Runs `lsblk --json` on the host
#[derive(Debug, Clone)]
pub struct LsblkLister {
    program: String,
}

impl LsblkLister {
    /// Create a lister invoking the given lsblk program
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn args() -> [&'static str; 3] {
        ["--json", "-o", LSBLK_COLUMNS]
    }
}

impl Default for LsblkLister {
    fn default() -> Self {
        Self::new("lsblk")
    }
}

#[async_trait]
impl DeviceLister for LsblkLister {
    async fn list(&self) -> LocatorResult<Vec<u8>> {
        debug!("Executing: {} {:?}", self.program, Self::args());

        // A hung lsblk is never killed; the locator only reports it
        let output = Command::new(&self.program)
            .args(Self::args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| LocatorError::command_failed(self.describe(), e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(LocatorError::command_exec(
                self.describe(),
                format!("{} ({})", stderr.trim(), output.status),
            ));
        }

        Ok(output.stdout)
    }

    fn describe(&self) -> String {
        format!("{} {}", self.program, Self::args().join(" "))
    }
}

/// Reads a previously captured `lsblk --json` report from disk
#[derive(Debug, Clone)]
pub struct FileLister {
    path: PathBuf,
}

impl FileLister {
    /// Create a lister reading the given file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DeviceLister for FileLister {
    async fn list(&self) -> LocatorResult<Vec<u8>> {
        tokio::fs::read(&self.path)
            .await
            .map_err(|e| LocatorError::io(format!("reading listing {}", self.path.display()), e))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
