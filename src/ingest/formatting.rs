//! Formatting utilities for usage figures
//!
//! Conversions back from canonical units into the units the report generator
//! prints, used by the JSON views and the ingest summary.

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;
const TIB: f64 = GIB * 1024.0;
const MBIT: f64 = 1000.0 * 1000.0;

pub fn bytes_to_gib(bytes: u64) -> f64 {
    bytes as f64 / GIB
}

pub fn bytes_to_tib(bytes: u64) -> f64 {
    bytes as f64 / TIB
}

pub fn bps_to_mbps(bps: u64) -> f64 {
    bps as f64 / MBIT
}

/// Formats byte values with binary units
///
/// # Examples
///
/// ```
/// use bandwidth_ledger::ingest::formatting::format_bytes;
///
/// assert_eq!(format_bytes(512), "512 B");
/// assert_eq!(format_bytes(1024), "1.00 KiB");
/// assert_eq!(format_bytes(1_610_612_736), "1.50 GiB");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    let value = bytes as f64;
    if value < 1024.0 {
        format!("{bytes} B")
    } else if value < 1024.0 * 1024.0 {
        format!("{:.2} KiB", value / 1024.0)
    } else if value < GIB {
        format!("{:.2} MiB", value / (1024.0 * 1024.0))
    } else if value < TIB {
        format!("{:.2} GiB", value / GIB)
    } else {
        format!("{:.2} TiB", value / TIB)
    }
}

/// Formats a rate in bits per second with decimal units
pub fn format_rate(bps: u64) -> String {
    let value = bps as f64;
    if value < 1000.0 {
        format!("{bps} bit/s")
    } else if value < MBIT {
        format!("{:.2} Kbit/s", value / 1000.0)
    } else if value < MBIT * 1000.0 {
        format!("{:.2} Mbit/s", value / MBIT)
    } else {
        format!("{:.2} Gbit/s", value / (MBIT * 1000.0))
    }
}

/// Formats an optional figure, showing a dash when the report had none
pub fn format_optional(value: Option<u64>, format: fn(u64) -> String) -> String {
    value.map(format).unwrap_or_else(|| "-".to_string())
}
