//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// cache-locator - pick the best cache directory for this node
///
/// Inspects the host's block devices and shared filesystems and prints
/// the directory a storage client should cache into.
#[derive(Parser, Debug)]
#[command(name = "cache-locator")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "CACHE_LOCATOR_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the cache directory to use
    Resolve(ResolveArgs),

    /// Show the block device tree and the NVMe selection
    Devices(DevicesArgs),

    /// Probe for a shared cache fileset
    Shared,

    /// Keep the locator running and log the selection periodically
    Monitor(MonitorArgs),

    /// Show or edit configuration
    Config(ConfigArgs),
}

/// Arguments for the resolve command
#[derive(Parser, Debug)]
pub struct ResolveArgs {
    /// Read an lsblk JSON report instead of running lsblk
    #[arg(short, long)]
    pub listing: Option<PathBuf>,

    /// Seconds to wait for device discovery before answering
    #[arg(short, long, default_value = "10")]
    pub wait: u64,

    /// Output format
    #[arg(short, long, default_value = "plain")]
    pub format: OutputFormat,
}

/// Arguments for the devices command
#[derive(Parser, Debug)]
pub struct DevicesArgs {
    /// Read an lsblk JSON report instead of running lsblk
    #[arg(short, long)]
    pub listing: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the monitor command
#[derive(Parser, Debug)]
pub struct MonitorArgs {
    /// Seconds between selection reports
    #[arg(short, long, default_value = "300")]
    pub interval: u64,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}
