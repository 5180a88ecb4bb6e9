//! Report ingestion module
//!
//! Turns the plain-text usage reports of the monitoring tool into typed
//! records and stores them.
//!
//! ## Module Organization
//!
//! - `units`: size and rate strings into bytes and bits per second
//! - `parser`: line-oriented report parser
//! - `normalizer`: raw records into canonical units
//! - `orchestrator`: the end-to-end ingestion call and its boundary response
//! - `records`: record and key types shared by the pipeline and the store
//! - `errors`: conversion and ingestion errors
//! - `formatting`: display helpers for stored figures

pub mod errors;
pub mod formatting;
pub mod normalizer;
pub mod orchestrator;
pub mod parser;
pub mod records;
pub mod units;

pub use errors::{ConversionError, IngestError};
pub use normalizer::normalize;
pub use orchestrator::{IngestOutcome, IngestResponse, Ingestor, SkippedRecord, UnknownInterfacePolicy};
pub use parser::{parse, ReportMarkers, ReportParser};
pub use records::{NormalizedRecord, Period, RawFieldRecord, YearMonth};
pub use units::{parse_rate, parse_size};

#[cfg(test)]
pub mod tests;
