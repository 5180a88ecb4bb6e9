//! Report text parser
//!
//! The monitoring tool emits reports shaped like this:
//!
//! ```text
//! - Ontem (2024-03-15):
//! --- Interface WAN
//! Entrada: 877.23 GiB
//! Saida: 120.50 GiB
//! Total: 997.73 GiB
//! Taxa de transferência média: 349.48 Mbit/s
//!
//! - No mês (2024-03):
//! --- Interface WAN
//! Entrada: 2.58 TiB
//! ...
//! ```
//!
//! Date markers set the period context, an interface line opens a record in
//! that context, and the value lines that follow fill the most recently opened
//! record. Parsing is a fold of [`step`] over the trimmed lines: every
//! transition is a pure function of the current [`ParserState`] and one line.

use chrono::NaiveDate;
use log::{debug, trace};
use regex::Regex;
use std::sync::LazyLock;

use crate::ingest::records::{Period, RawField, RawFieldRecord, YearMonth};

static DAY_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((\d{4}-\d{2}-\d{2})\)").expect("valid regex"));

static MONTH_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((\d{4}-\d{2})\)").expect("valid regex"));

/// Line prefixes that drive the parser
#[derive(Debug, Clone)]
pub struct ReportMarkers {
    /// Starts a daily context; the line embeds `(YYYY-MM-DD)`
    pub daily: &'static str,
    /// Starts a monthly context; the line embeds `(YYYY-MM)`
    pub monthly: &'static str,
    /// Opens an interface section; the interface name follows the prefix
    pub interface: &'static str,
    pub inbound: &'static [&'static str],
    pub outbound: &'static [&'static str],
    pub total: &'static [&'static str],
    pub rate: &'static [&'static str],
}

impl ReportMarkers {
    /// Labels written by the Portuguese-language report generator
    pub const fn portuguese() -> Self {
        Self {
            daily: "- Ontem (",
            monthly: "- No mês (",
            interface: "--- Interface ",
            inbound: &["Entrada:"],
            outbound: &["Saida:", "Saída:"],
            total: &["Total:"],
            rate: &["Taxa de transferência média:"],
        }
    }

    fn value_field<'l>(&self, line: &'l str) -> Option<(RawField, &'l str)> {
        let groups: [(RawField, &[&str]); 4] = [
            (RawField::Inbound, self.inbound),
            (RawField::Outbound, self.outbound),
            (RawField::Total, self.total),
            (RawField::Rate, self.rate),
        ];
        groups.into_iter().find_map(|(field, labels)| {
            labels
                .iter()
                .find_map(|label| line.strip_prefix(label))
                .map(|rest| (field, rest.trim()))
        })
    }
}

impl Default for ReportMarkers {
    fn default() -> Self {
        Self::portuguese()
    }
}

/// Period context established by the last date marker
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParseContext {
    #[default]
    NoContext,
    Daily(NaiveDate),
    /// Carries the first day of the month
    Monthly(NaiveDate),
}

impl ParseContext {
    fn active(self) -> Option<(Period, NaiveDate)> {
        match self {
            ParseContext::NoContext => None,
            ParseContext::Daily(date) => Some((Period::Daily, date)),
            ParseContext::Monthly(date) => Some((Period::Monthly, date)),
        }
    }
}

/// Parser state threaded through the line fold
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParserState {
    pub context: ParseContext,
    /// Index of the record that value lines fill
    pub cursor: Option<usize>,
    /// Number of records opened so far
    pub opened: usize,
}

/// Effect of one line on the record sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineAction {
    Open(RawFieldRecord),
    Fill {
        index: usize,
        field: RawField,
        value: String,
    },
}

/// Transition function: consumes one trimmed line
pub fn step(
    markers: &ReportMarkers,
    state: ParserState,
    line: &str,
) -> (ParserState, Option<LineAction>) {
    if line.is_empty() {
        return (state, None);
    }

    if line.starts_with(markers.daily) {
        let context = day_marker_date(line).map(ParseContext::Daily);
        return (with_context(state, context, line), None);
    }

    if line.starts_with(markers.monthly) {
        let context = month_marker_date(line).map(ParseContext::Monthly);
        return (with_context(state, context, line), None);
    }

    let interface_rest = line
        .strip_prefix(markers.interface)
        .or_else(|| (line == markers.interface.trim_end()).then_some(""));
    if let Some(rest) = interface_rest {
        let Some((period, date)) = state.context.active() else {
            trace!("Interface line before any date marker ignored: {line}");
            return (state, None);
        };
        let name = rest.trim().trim_end_matches('-').trim_end();
        let next = ParserState {
            cursor: Some(state.opened),
            opened: state.opened + 1,
            ..state
        };
        return (
            next,
            Some(LineAction::Open(RawFieldRecord::new(name, date, period))),
        );
    }

    if let Some((field, value)) = markers.value_field(line) {
        let (Some(index), false) = (state.cursor, value.is_empty()) else {
            return (state, None);
        };
        return (
            state,
            Some(LineAction::Fill {
                index,
                field,
                value: value.to_string(),
            }),
        );
    }

    (state, None)
}

fn with_context(state: ParserState, context: Option<ParseContext>, line: &str) -> ParserState {
    match context {
        Some(context) => ParserState { context, ..state },
        None => {
            debug!("Date marker without a usable date, keeping previous context: {line}");
            state
        }
    }
}

fn day_marker_date(line: &str) -> Option<NaiveDate> {
    let caps = DAY_DATE_RE.captures(line)?;
    NaiveDate::parse_from_str(&caps[1], "%Y-%m-%d").ok()
}

fn month_marker_date(line: &str) -> Option<NaiveDate> {
    let caps = MONTH_DATE_RE.captures(line)?;
    caps[1].parse::<YearMonth>().ok().map(YearMonth::first_day)
}

fn apply(mut records: Vec<RawFieldRecord>, action: LineAction) -> Vec<RawFieldRecord> {
    match action {
        LineAction::Open(record) => records.push(record),
        LineAction::Fill { index, field, value } => {
            if let Some(record) = records.get_mut(index) {
                record.set(field, value);
            }
        }
    }
    records
}

/// Extracts raw usage records from report text
#[derive(Debug, Clone, Default)]
pub struct ReportParser {
    markers: ReportMarkers,
}

impl ReportParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_markers(markers: ReportMarkers) -> Self {
        Self { markers }
    }

    /// Returns one record per interface section, in text order
    pub fn parse(&self, text: &str) -> Vec<RawFieldRecord> {
        let (_, records) = text.lines().map(str::trim).fold(
            (ParserState::default(), Vec::new()),
            |(state, records), line| {
                let (next, action) = step(&self.markers, state, line);
                let records = match action {
                    Some(action) => apply(records, action),
                    None => records,
                };
                (next, records)
            },
        );
        debug!("Parsed {} interface section(s) from report", records.len());
        records
    }
}

/// Parses report text with the default markers
pub fn parse(text: &str) -> Vec<RawFieldRecord> {
    ReportParser::new().parse(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_step_daily_marker() {
        let markers = ReportMarkers::default();
        let (state, action) = step(&markers, ParserState::default(), "- Ontem (2024-03-15):");
        assert_eq!(state.context, ParseContext::Daily(date(2024, 3, 15)));
        assert!(action.is_none());
    }

    #[test]
    fn test_step_monthly_marker_normalizes_to_first_day() {
        let markers = ReportMarkers::default();
        let (state, _) = step(&markers, ParserState::default(), "- No mês (2024-03):");
        assert_eq!(state.context, ParseContext::Monthly(date(2024, 3, 1)));
    }

    #[test]
    fn test_step_invalid_marker_keeps_context() {
        let markers = ReportMarkers::default();
        let start = ParserState {
            context: ParseContext::Daily(date(2024, 3, 15)),
            ..ParserState::default()
        };
        let (state, _) = step(&markers, start, "- Ontem (2024-02-30):");
        assert_eq!(state, start);
        let (state, _) = step(&markers, start, "- No mês (sem data):");
        assert_eq!(state, start);
    }

    #[test]
    fn test_step_interface_opens_record_and_moves_cursor() {
        let markers = ReportMarkers::default();
        let start = ParserState {
            context: ParseContext::Daily(date(2024, 3, 15)),
            cursor: Some(0),
            opened: 1,
        };
        let (state, action) = step(&markers, start, "--- Interface CAMPUS");
        assert_eq!(state.cursor, Some(1));
        assert_eq!(state.opened, 2);
        match action {
            Some(LineAction::Open(record)) => {
                assert_eq!(record.interface_name, "CAMPUS");
                assert_eq!(record.period, Period::Daily);
            }
            other => panic!("expected an open action, got {other:?}"),
        }
    }

    #[test]
    fn test_step_interface_without_context_is_ignored() {
        let markers = ReportMarkers::default();
        let (state, action) = step(&markers, ParserState::default(), "--- Interface WAN");
        assert_eq!(state, ParserState::default());
        assert!(action.is_none());
    }

    #[test]
    fn test_step_value_without_record_is_ignored() {
        let markers = ReportMarkers::default();
        let start = ParserState {
            context: ParseContext::Daily(date(2024, 3, 15)),
            ..ParserState::default()
        };
        let (_, action) = step(&markers, start, "Entrada: 1.00 GiB");
        assert!(action.is_none());
    }

    #[test]
    fn test_step_value_fills_cursor() {
        let markers = ReportMarkers::default();
        let start = ParserState {
            context: ParseContext::Daily(date(2024, 3, 15)),
            cursor: Some(3),
            opened: 4,
        };
        let (_, action) = step(&markers, start, "Taxa de transferência média: 10.00 Mbit/s");
        assert_eq!(
            action,
            Some(LineAction::Fill {
                index: 3,
                field: RawField::Rate,
                value: "10.00 Mbit/s".to_string(),
            })
        );
    }

    #[test]
    fn test_interface_name_decoration_is_stripped() {
        let records = parse("- Ontem (2024-03-15)\n--- Interface ETICE_GOV ---\n");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].interface_name, "ETICE_GOV");
    }

    #[test]
    fn test_bare_interface_line_opens_unnamed_section() {
        let text = "- Ontem (2024-03-15)\n--- Interface WAN\nEntrada: 1 GiB\n\
                    --- Interface \nEntrada: 9 GiB\n";
        let records = parse(text);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].interface_name, "WAN");
        assert_eq!(records[0].inbound_raw.as_deref(), Some("1 GiB"));
        assert_eq!(records[1].interface_name, "");
        assert_eq!(records[1].inbound_raw.as_deref(), Some("9 GiB"));
    }
}
