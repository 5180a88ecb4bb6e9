//! Ingestion of a whole report
//!
//! [`Ingestor`] ties the pipeline together: it parses the report, resolves
//! every interface section against the known interfaces, normalizes the values
//! and hands the accepted records to the store as one transaction.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::ingest::errors::IngestError;
use crate::ingest::normalizer::normalize;
use crate::ingest::parser::ReportParser;
use crate::ingest::records::{NormalizedRecord, Period, RawFieldRecord, RecordKey};
use crate::storage::{InterfaceRegistry, UsageStore};

/// What to do with a section naming an interface that is not registered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownInterfacePolicy {
    /// Skip the section and report it in [`IngestOutcome::dropped`]
    #[default]
    Drop,
    /// Fail the whole ingestion without writing anything
    Reject,
}

/// A section left out of the stored batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRecord {
    pub interface_name: String,
    pub reference_date: chrono::NaiveDate,
    pub period: Period,
    pub reason: String,
}

impl SkippedRecord {
    fn from_raw(raw: &RawFieldRecord, reason: impl Into<String>) -> Self {
        Self {
            interface_name: raw.interface_name.clone(),
            reference_date: raw.reference_date,
            period: raw.period,
            reason: reason.into(),
        }
    }
}

/// Result of a successful ingestion call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestOutcome {
    /// Number of distinct records written
    pub accepted_count: usize,
    /// The written records, in report order
    pub records: Vec<NormalizedRecord>,
    /// Sections naming an unregistered interface
    pub dropped: Vec<SkippedRecord>,
    /// Sections whose values could not be converted
    pub rejected: Vec<SkippedRecord>,
    /// Sections replaced by a later section with the same key
    pub superseded: usize,
}

pub struct Ingestor<'a, S> {
    store: &'a S,
    parser: ReportParser,
    policy: UnknownInterfacePolicy,
}

impl<'a, S> Ingestor<'a, S>
where
    S: InterfaceRegistry + UsageStore,
{
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            parser: ReportParser::new(),
            policy: UnknownInterfacePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: UnknownInterfacePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_parser(mut self, parser: ReportParser) -> Self {
        self.parser = parser;
        self
    }

    pub fn ingest(&self, text: &str) -> Result<IngestOutcome, IngestError> {
        if text.trim().is_empty() {
            return Err(IngestError::EmptyInput);
        }

        let raw_records = self.parser.parse(text);
        if raw_records.is_empty() {
            return Err(IngestError::NoValidData);
        }

        let mut outcome = IngestOutcome::default();
        let mut positions: HashMap<RecordKey, usize> = HashMap::new();

        for raw in &raw_records {
            if self.store.lookup(&raw.interface_name)?.is_none() {
                match self.policy {
                    UnknownInterfacePolicy::Reject => {
                        return Err(IngestError::UnknownInterface(raw.interface_name.clone()));
                    }
                    UnknownInterfacePolicy::Drop => {
                        warn!(
                            "Dropping section for unknown interface '{}' ({} {})",
                            raw.interface_name, raw.period, raw.reference_date
                        );
                        outcome
                            .dropped
                            .push(SkippedRecord::from_raw(raw, "unknown interface"));
                        continue;
                    }
                }
            }

            let record = match normalize(raw) {
                Ok(record) => record,
                Err(e) => {
                    warn!(
                        "Rejecting section for '{}' ({} {}): {e}",
                        raw.interface_name, raw.period, raw.reference_date
                    );
                    outcome
                        .rejected
                        .push(SkippedRecord::from_raw(raw, e.to_string()));
                    continue;
                }
            };

            let key = record.key();
            match positions.get(&key).copied() {
                Some(index) => {
                    debug!(
                        "Section for '{}' ({} {}) replaces an earlier one",
                        record.interface_name, record.period, record.reference_date
                    );
                    outcome.records[index] = record;
                    outcome.superseded += 1;
                }
                None => {
                    positions.insert(key, outcome.records.len());
                    outcome.records.push(record);
                }
            }
        }

        if !outcome.records.is_empty() {
            outcome.accepted_count = self.store.upsert_batch(&outcome.records)?;
        }

        info!(
            "Ingested {} record(s): {} dropped, {} rejected, {} superseded",
            outcome.accepted_count,
            outcome.dropped.len(),
            outcome.rejected.len(),
            outcome.superseded
        );
        Ok(outcome)
    }
}

/// Boundary view of an ingestion call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestResponse {
    pub accepted: bool,
    pub message: String,
    pub records_saved: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<IngestOutcome>,
}

impl IngestResponse {
    /// Turns the result of [`Ingestor::ingest`] into a caller-facing message
    pub fn from_result(result: Result<IngestOutcome, IngestError>) -> Self {
        match result {
            Ok(outcome) => {
                let mut message = format!(
                    "Data processed successfully! {} record(s) saved.",
                    outcome.accepted_count
                );
                if outcome.superseded > 0 {
                    message.push_str(&format!(
                        " {} duplicate section(s) replaced by a later one.",
                        outcome.superseded
                    ));
                }
                Self {
                    accepted: true,
                    message,
                    records_saved: outcome.accepted_count,
                    outcome: Some(outcome),
                }
            }
            Err(e) => {
                let message = match &e {
                    IngestError::EmptyInput => "No data provided".to_string(),
                    IngestError::NoValidData => "No valid data found".to_string(),
                    other => format!("Error: {other}"),
                };
                Self {
                    accepted: false,
                    message,
                    records_saved: 0,
                    outcome: None,
                }
            }
        }
    }
}
