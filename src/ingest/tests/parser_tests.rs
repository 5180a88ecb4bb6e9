//! Tests for the report parser
//!
//! These exercise whole documents; single-line transitions are covered next to
//! the transition function itself.

#[cfg(test)]
mod tests {
    use crate::ingest::parser::{parse, ReportMarkers, ReportParser};
    use crate::ingest::records::Period;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    const DAILY_REPORT: &str = "\
Relatório de consumo de banda
- Ontem (2024-03-15):
--- Interface WAN
Entrada: 1.00GiB
Saida: 500.00MiB
Total: 1.50GiB
Taxa de transferência média: 10.00Mbit/s
";

    #[test]
    fn test_parse_daily_section() {
        let records = parse(DAILY_REPORT);
        assert_eq!(records.len(), 1);

        let record = &records[0];
        assert_eq!(record.interface_name, "WAN");
        assert_eq!(record.reference_date, date(2024, 3, 15));
        assert_eq!(record.period, Period::Daily);
        assert_eq!(record.inbound_raw.as_deref(), Some("1.00GiB"));
        assert_eq!(record.outbound_raw.as_deref(), Some("500.00MiB"));
        assert_eq!(record.total_raw.as_deref(), Some("1.50GiB"));
        assert_eq!(record.rate_raw.as_deref(), Some("10.00Mbit/s"));
    }

    #[test]
    fn test_parse_monthly_section() {
        let records = parse("- No mês (2024-03):\n--- Interface DI\nEntrada: 2.58 TiB\n");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].period, Period::Monthly);
        assert_eq!(records[0].reference_date, date(2024, 3, 1));
        assert_eq!(records[0].inbound_raw.as_deref(), Some("2.58 TiB"));
    }

    #[test]
    fn test_parse_preserves_section_order() {
        let text = "\
- Ontem (2024-03-15)
--- Interface DI
Entrada: 1 GiB
--- Interface CAMPUS
Entrada: 2 GiB
--- Interface WAN
Entrada: 3 GiB
";
        let names: Vec<_> = parse(text)
            .into_iter()
            .map(|r| (r.interface_name, r.inbound_raw))
            .collect();
        assert_eq!(
            names,
            vec![
                ("DI".to_string(), Some("1 GiB".to_string())),
                ("CAMPUS".to_string(), Some("2 GiB".to_string())),
                ("WAN".to_string(), Some("3 GiB".to_string())),
            ]
        );
    }

    #[test]
    fn test_parse_daily_and_monthly_contexts() {
        let text = "\
- Ontem (2024-03-15):
--- Interface WAN
Entrada: 877.23 GiB

- No mês (2024-03):
--- Interface WAN
Entrada: 2.58 TiB
--- Interface DI
Entrada: 1.10 TiB
";
        let records = parse(text);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].period, Period::Daily);
        assert_eq!(records[1].period, Period::Monthly);
        assert_eq!(records[1].reference_date, date(2024, 3, 1));
        assert_eq!(records[2].period, Period::Monthly);
        assert_eq!(records[2].interface_name, "DI");
    }

    #[test]
    fn test_parse_ignores_sections_before_any_context() {
        let text = "\
--- Interface WAN
Entrada: 9 GiB
- Ontem (2024-03-15)
--- Interface DI
Entrada: 1 GiB
";
        let records = parse(text);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].interface_name, "DI");
        assert_eq!(records[0].inbound_raw.as_deref(), Some("1 GiB"));
    }

    #[test]
    fn test_parse_missing_fields_stay_absent() {
        let records = parse("- Ontem (2024-03-15)\n--- Interface WAN\nTotal: 3 GiB\n");
        assert_eq!(records.len(), 1);
        assert!(records[0].inbound_raw.is_none());
        assert!(records[0].outbound_raw.is_none());
        assert!(records[0].rate_raw.is_none());
        assert_eq!(records[0].total_raw.as_deref(), Some("3 GiB"));
    }

    #[test]
    fn test_parse_empty_value_stays_absent() {
        let records = parse("- Ontem (2024-03-15)\n--- Interface WAN\nEntrada:   \n");
        assert!(records[0].inbound_raw.is_none());
    }

    #[test]
    fn test_parse_keeps_duplicate_sections() {
        let text = "\
- Ontem (2024-03-15)
--- Interface WAN
Entrada: 1 GiB
--- Interface WAN
Entrada: 2 GiB
";
        let records = parse(text);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].inbound_raw.as_deref(), Some("2 GiB"));
    }

    #[test]
    fn test_parse_tolerates_indentation_and_crlf() {
        let text = "  - Ontem (2024-03-15):\r\n\t--- Interface WAN\r\n    Saída: 4 GiB\r\n";
        let records = parse(text);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].outbound_raw.as_deref(), Some("4 GiB"));
    }

    #[test]
    fn test_parse_nothing_recognizable() {
        assert!(parse("").is_empty());
        assert!(parse("hello\nworld\n").is_empty());
        assert!(parse("- Ontem (2024-03-15)\nEntrada: 1 GiB\n").is_empty());
    }

    #[test]
    fn test_parse_invalid_date_keeps_previous_context() {
        let text = "\
- Ontem (2024-03-15)
- Ontem (2024-02-31)
--- Interface WAN
";
        let records = parse(text);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].reference_date, date(2024, 3, 15));
    }

    #[test]
    fn test_parser_with_custom_markers() {
        let markers = ReportMarkers {
            daily: "Yesterday (",
            monthly: "This month (",
            interface: "Interface: ",
            inbound: &["In:"],
            outbound: &["Out:"],
            total: &["Total:"],
            rate: &["Average:"],
        };
        let parser = ReportParser::with_markers(markers);
        let records = parser.parse("This month (2024-05)\nInterface: WAN\nIn: 1 TiB\nAverage: 5 Mbit/s\n");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].reference_date, date(2024, 5, 1));
        assert_eq!(records[0].inbound_raw.as_deref(), Some("1 TiB"));
        assert_eq!(records[0].rate_raw.as_deref(), Some("5 Mbit/s"));
    }
}
