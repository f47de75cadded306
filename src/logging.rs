//! Log filter and subscriber setup

use crate::gauge::GAUGE_TARGET;
use tracing_subscriber::EnvFilter;

/// Filter for a given `-v` count
///
/// 0 = warn, 1 = info, 2+ = debug. The gauge target is always kept at
/// info so the published cache directory is visible without `-v`.
pub fn log_filter(verbose: u8) -> EnvFilter {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    EnvFilter::new(format!("cache_locator={level},{GAUGE_TARGET}=info"))
}

/// Install the global subscriber, writing to stderr
pub fn init_logging(verbose: u8, json: bool) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(log_filter(verbose))
        .with_writer(std::io::stderr)
        .with_target(false);

    if json {
        builder.json().init();
    } else {
        builder.without_time().init();
    }
}
