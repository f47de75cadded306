//! Devices command - show the block device tree and the NVMe selection

use super::lister_for;
use crate::cli::args::{DevicesArgs, OutputFormat};
use crate::config::Config;
use crate::device::{DeviceListing, DeviceLister};
use crate::error::LocatorResult;
use crate::hostfs::{HostRoot, RealHostFs};
use crate::selector::NvmeSelector;
use chrono::Utc;
use console::style;
use tracing::debug;

/// Execute the devices command
pub async fn execute(args: DevicesArgs, config: &Config) -> LocatorResult<()> {
    let lister = lister_for(args.listing, config);
    let output = lister.list().await?;
    let listing = DeviceListing::from_json(&output)?;
    debug!(
        "Parsed {} root devices from {}",
        listing.devices.len(),
        lister.describe()
    );

    let fs = RealHostFs::new();
    let host_root = HostRoot::new(config.discovery.host_root.clone());
    let selected = NvmeSelector::new(&fs, &host_root).select(&listing);

    match args.format {
        OutputFormat::Table => print_table(&listing, selected.as_deref()),
        OutputFormat::Json => print_json(lister.as_ref(), &listing, selected.as_deref())?,
        OutputFormat::Plain => {
            if let Some(path) = selected {
                println!("{}", path);
            }
        }
    }

    Ok(())
}

fn print_table(listing: &DeviceListing, selected: Option<&str>) {
    println!(
        "{:<24} {:<8} {:>8} {:<6} {:<30}",
        "NAME", "TYPE", "SIZE", "TRAN", "MOUNTPOINT"
    );
    println!("{}", "-".repeat(80));

    for (depth, device) in listing.walk() {
        let name = format!("{}{}", "  ".repeat(depth), device.name);
        println!(
            "{:<24} {:<8} {:>8} {:<6} {:<30}",
            name,
            device.kind,
            device.size,
            device.transport().unwrap_or("-"),
            device.mountpoint().unwrap_or("")
        );
    }

    println!();
    match selected {
        Some(path) => println!("Selected NVMe mountpoint: {}", style(path).green().bold()),
        None => println!("{}", style("No NVMe mountpoint found").yellow()),
    }
}

fn print_json(
    lister: &dyn DeviceLister,
    listing: &DeviceListing,
    selected: Option<&str>,
) -> LocatorResult<()> {
    #[derive(serde::Serialize)]
    struct DevicesJson<'a> {
        captured_at: String,
        source: String,
        selected: Option<&'a str>,
        blockdevices: &'a [crate::device::Device],
    }

    let report = DevicesJson {
        captured_at: Utc::now().to_rfc3339(),
        source: lister.describe(),
        selected,
        blockdevices: &listing.devices,
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
