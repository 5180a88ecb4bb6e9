//! Usage record types
//!
//! This module contains the record types that flow through the ingestion
//! pipeline: raw records as extracted from report text, normalized records
//! ready for storage, and the small value types they are keyed by.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ingest::errors::ConversionError;

/// Granularity of a usage measurement
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// Figures for a single day
    Daily,
    /// Figures for a calendar month, dated on its first day
    Monthly,
}

impl Period {
    pub fn as_str(self) -> &'static str {
        match self {
            Period::Daily => "daily",
            Period::Monthly => "monthly",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" | "day" | "diario" => Ok(Period::Daily),
            "monthly" | "month" | "mensal" => Ok(Period::Monthly),
            other => Err(format!("unknown period '{other}' (expected daily or monthly)")),
        }
    }
}

/// A calendar month, written `YYYY-MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct YearMonth {
    first_day: NaiveDate,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|first_day| Self { first_day })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            first_day: date.with_day(1).unwrap_or(date),
        }
    }

    pub fn year(self) -> i32 {
        self.first_day.year()
    }

    pub fn month(self) -> u32 {
        self.first_day.month()
    }

    /// First day of the month, the reference date of monthly records
    pub fn first_day(self) -> NaiveDate {
        self.first_day
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl FromStr for YearMonth {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConversionError::InvalidMonth(s.to_string());
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year = year.parse::<i32>().map_err(|_| invalid())?;
        let month = month.parse::<u32>().map_err(|_| invalid())?;
        Self::new(year, month).ok_or_else(invalid)
    }
}

/// Natural key of a stored usage record
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordKey {
    pub interface_name: String,
    pub reference_date: NaiveDate,
    pub period: Period,
}

/// Which value line of an interface section a string came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawField {
    Inbound,
    Outbound,
    Total,
    Rate,
}

/// One interface's figures for one date and period, before unit conversion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFieldRecord {
    pub interface_name: String,
    pub reference_date: NaiveDate,
    pub period: Period,
    pub inbound_raw: Option<String>,
    pub outbound_raw: Option<String>,
    pub total_raw: Option<String>,
    pub rate_raw: Option<String>,
}

impl RawFieldRecord {
    /// Opens a record for an interface section with every value absent
    pub fn new(interface_name: impl Into<String>, reference_date: NaiveDate, period: Period) -> Self {
        Self {
            interface_name: interface_name.into(),
            reference_date,
            period,
            inbound_raw: None,
            outbound_raw: None,
            total_raw: None,
            rate_raw: None,
        }
    }

    pub fn set(&mut self, field: RawField, value: String) {
        let slot = match field {
            RawField::Inbound => &mut self.inbound_raw,
            RawField::Outbound => &mut self.outbound_raw,
            RawField::Total => &mut self.total_raw,
            RawField::Rate => &mut self.rate_raw,
        };
        *slot = Some(value);
    }
}

/// Usage figures in canonical units, ready for storage
///
/// A `None` value means the report did not carry that figure, which is kept
/// apart from a measured zero. The `*_or_zero` accessors give the flattened
/// view where a missing figure counts as 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub interface_name: String,
    pub reference_date: NaiveDate,
    pub period: Period,
    pub inbound_bytes: Option<u64>,
    pub outbound_bytes: Option<u64>,
    pub total_bytes: Option<u64>,
    pub rate_bps: Option<u64>,
}

impl NormalizedRecord {
    pub fn key(&self) -> RecordKey {
        RecordKey {
            interface_name: self.interface_name.clone(),
            reference_date: self.reference_date,
            period: self.period,
        }
    }

    pub fn inbound_bytes_or_zero(&self) -> u64 {
        self.inbound_bytes.unwrap_or(0)
    }

    pub fn outbound_bytes_or_zero(&self) -> u64 {
        self.outbound_bytes.unwrap_or(0)
    }

    pub fn total_bytes_or_zero(&self) -> u64 {
        self.total_bytes.unwrap_or(0)
    }

    pub fn rate_bps_or_zero(&self) -> u64 {
        self.rate_bps.unwrap_or(0)
    }
}
