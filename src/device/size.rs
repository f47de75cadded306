//! Human-readable size parsing
//!
//! `lsblk` prints sizes like `3.5T` or `447.1G` using powers of 1024, while
//! `bytesize` reads a bare letter as a decimal unit. Bare letters are
//! rewritten to their `Ki`-style form first; explicit `KB`-style suffixes
//! stay decimal.

use bytesize::ByteSize;
use std::str::FromStr;

/// Why a size string could not be parsed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SizeParseError {
    #[error("missing number")]
    MissingNumber,

    #[error("invalid size {input:?}: {reason}")]
    Invalid { input: String, reason: String },
}

/// Rewrite lsblk's bare binary unit letters (`T`) into IEC form (`Ti`)
fn normalize(s: &str) -> String {
    let split = s
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(s.len());
    let (number, unit) = s.split_at(split);
    let unit = unit.trim();

    match unit.to_ascii_uppercase().as_str() {
        "K" | "M" | "G" | "T" | "P" => format!("{number}{unit}i"),
        _ => format!("{number}{unit}"),
    }
}

/// Parse a human-readable size such as `3.5T`, `100M` or `2 GB` into bytes
pub fn parse_size(s: &str) -> Result<u64, SizeParseError> {
    let s = s.trim();
    if !s.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return Err(SizeParseError::MissingNumber);
    }

    ByteSize::from_str(&normalize(s))
        .map(|size| size.as_u64())
        .map_err(|reason| SizeParseError::Invalid {
            input: s.to_string(),
            reason,
        })
}
