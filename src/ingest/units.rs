//! Unit conversion for report values
//!
//! Reports write volumes as `<number> <unit>` ("877.23 GiB") and average rates
//! as `<number> <unit>/s` ("349.48 Mbit/s"). These functions turn both into
//! integers: bytes for volumes, bits per second for rates.
//!
//! Matching is case-insensitive and ignores spaces. An unknown unit suffix is
//! taken with a multiplier of 1, and a string with no suffix at all is read as
//! a bare number. The product is truncated toward zero.

use log::trace;
use regex::Regex;
use std::sync::LazyLock;

use crate::ingest::errors::ConversionError;

/// Placeholder some report generators print for a missing figure
pub const MISSING_PLACEHOLDER: &str = "None";

static SIZE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9.]+)([a-z]+)").expect("valid regex"));

static RATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9.]+)([a-z]+/s)").expect("valid regex"));

const KIB: f64 = 1024.0;
const KB: f64 = 1000.0;

/// Byte multiplier for a lower-cased size unit
fn size_multiplier(unit: &str) -> f64 {
    match unit {
        "kib" => KIB,
        "mib" => KIB.powi(2),
        "gib" => KIB.powi(3),
        "tib" => KIB.powi(4),
        "kb" => KB,
        "mb" => KB.powi(2),
        "gb" => KB.powi(3),
        "tb" => KB.powi(4),
        _ => 1.0,
    }
}

/// Bits-per-second multiplier for a lower-cased rate unit
fn rate_multiplier(unit: &str) -> f64 {
    match unit {
        "kbit/s" => KB,
        "mbit/s" => KB.powi(2),
        "gbit/s" => KB.powi(3),
        "tbit/s" => KB.powi(4),
        _ => 1.0,
    }
}

/// Returns true when `text` carries no figure at all
pub fn is_missing(text: Option<&str>) -> bool {
    match text.map(str::trim) {
        None => true,
        Some(value) => value.is_empty() || value == MISSING_PLACEHOLDER,
    }
}

/// Converts a size string such as "2.58 TiB" into bytes
///
/// Absent input, an empty string and the `None` placeholder convert to 0.
///
/// # Examples
///
/// ```
/// use bandwidth_ledger::ingest::units::parse_size;
///
/// assert_eq!(parse_size(Some("1.00 GiB")).unwrap(), 1_073_741_824);
/// assert_eq!(parse_size(Some("2 kb")).unwrap(), 2_000);
/// assert_eq!(parse_size(Some("500")).unwrap(), 500);
/// assert_eq!(parse_size(None).unwrap(), 0);
/// ```
pub fn parse_size(text: Option<&str>) -> Result<u64, ConversionError> {
    convert(text, &SIZE_RE, size_multiplier)
}

/// Converts a rate string such as "349.48 Mbit/s" into bits per second
///
/// # Examples
///
/// ```
/// use bandwidth_ledger::ingest::units::parse_rate;
///
/// assert_eq!(parse_rate(Some("10.00 Mbit/s")).unwrap(), 10_000_000);
/// assert_eq!(parse_rate(None).unwrap(), 0);
/// ```
pub fn parse_rate(text: Option<&str>) -> Result<u64, ConversionError> {
    convert(text, &RATE_RE, rate_multiplier)
}

fn convert(
    text: Option<&str>,
    pattern: &Regex,
    multiplier: fn(&str) -> f64,
) -> Result<u64, ConversionError> {
    if is_missing(text) {
        return Ok(0);
    }
    let original = text.unwrap_or_default().trim();
    let compact: String = original
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    let (number, factor) = match pattern.captures(&compact) {
        Some(caps) => {
            let unit = &caps[2];
            (caps[1].to_string(), multiplier(unit))
        }
        None => (compact.clone(), 1.0),
    };

    let value: f64 = number
        .parse()
        .map_err(|_| ConversionError::InvalidNumber(original.to_string()))?;
    to_integer(value * factor, original)
}

fn to_integer(product: f64, original: &str) -> Result<u64, ConversionError> {
    if !product.is_finite() {
        return Err(ConversionError::InvalidNumber(original.to_string()));
    }
    if product < 0.0 {
        return Err(ConversionError::Negative(original.to_string()));
    }
    // Stored as a signed SQLite INTEGER
    if product >= i64::MAX as f64 {
        return Err(ConversionError::Overflow(original.to_string()));
    }
    let truncated = product.trunc() as u64;
    trace!("Converted '{original}' to {truncated}");
    Ok(truncated)
}
