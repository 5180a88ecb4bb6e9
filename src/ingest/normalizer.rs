//! Converts raw report records into canonical units

use crate::ingest::errors::ConversionError;
use crate::ingest::records::{NormalizedRecord, RawFieldRecord};
use crate::ingest::units::{is_missing, parse_rate, parse_size};

fn optional(
    text: Option<&str>,
    convert: fn(Option<&str>) -> Result<u64, ConversionError>,
) -> Result<Option<u64>, ConversionError> {
    if is_missing(text) {
        return Ok(None);
    }
    convert(text).map(Some)
}

/// Applies unit conversion to every value of a raw record
///
/// Identity fields pass through unchanged. A figure missing from the report
/// stays `None`; a figure that fails conversion fails the whole record.
pub fn normalize(raw: &RawFieldRecord) -> Result<NormalizedRecord, ConversionError> {
    Ok(NormalizedRecord {
        interface_name: raw.interface_name.clone(),
        reference_date: raw.reference_date,
        period: raw.period,
        inbound_bytes: optional(raw.inbound_raw.as_deref(), parse_size)?,
        outbound_bytes: optional(raw.outbound_raw.as_deref(), parse_size)?,
        total_bytes: optional(raw.total_raw.as_deref(), parse_size)?,
        rate_bps: optional(raw.rate_raw.as_deref(), parse_rate)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::records::Period;
    use chrono::NaiveDate;

    fn raw() -> RawFieldRecord {
        RawFieldRecord::new(
            "WAN",
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            Period::Daily,
        )
    }

    #[test]
    fn test_all_absent_normalizes_to_zero() {
        let record = normalize(&raw()).unwrap();
        assert_eq!(record.inbound_bytes, None);
        assert_eq!(record.outbound_bytes, None);
        assert_eq!(record.total_bytes, None);
        assert_eq!(record.rate_bps, None);

        assert_eq!(record.inbound_bytes_or_zero(), 0);
        assert_eq!(record.outbound_bytes_or_zero(), 0);
        assert_eq!(record.total_bytes_or_zero(), 0);
        assert_eq!(record.rate_bps_or_zero(), 0);
    }

    #[test]
    fn test_identity_fields_pass_through() {
        let mut input = raw();
        input.inbound_raw = Some("1.00 GiB".to_string());
        let record = normalize(&input).unwrap();
        assert_eq!(record.interface_name, "WAN");
        assert_eq!(record.period, Period::Daily);
        assert_eq!(record.reference_date, input.reference_date);
        assert_eq!(record.inbound_bytes, Some(1_073_741_824));
    }

    #[test]
    fn test_placeholder_and_measured_zero_are_distinct() {
        let mut input = raw();
        input.inbound_raw = Some("None".to_string());
        input.outbound_raw = Some("0.00 GiB".to_string());
        let record = normalize(&input).unwrap();
        assert_eq!(record.inbound_bytes, None);
        assert_eq!(record.outbound_bytes, Some(0));
    }

    #[test]
    fn test_malformed_value_fails_record() {
        let mut input = raw();
        input.total_raw = Some("lots of GiB".to_string());
        assert!(matches!(
            normalize(&input),
            Err(ConversionError::InvalidNumber(_))
        ));
    }
}
