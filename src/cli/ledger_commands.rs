use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use log::info;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use tokio::io::AsyncReadExt;

use crate::config::AppConfig;
use crate::ingest::formatting::{
    bps_to_mbps, bytes_to_gib, bytes_to_tib, format_bytes, format_optional, format_rate,
};
use crate::ingest::{
    IngestResponse, Ingestor, NormalizedRecord, Period, UnknownInterfacePolicy, YearMonth,
};
use crate::storage::{Interface, InterfaceRegistry, SqliteUsageStore, StoreStatus, UsageStore};

#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub date: NaiveDate,
    pub period: Period,
    pub inbound_bytes: Option<u64>,
    pub outbound_bytes: Option<u64>,
    pub total_bytes: Option<u64>,
    pub rate_bps: Option<u64>,
    pub inbound_gib: Option<f64>,
    pub outbound_gib: Option<f64>,
    pub total_gib: Option<f64>,
    pub rate_mbps: Option<f64>,
}

impl From<NormalizedRecord> for HistoryEntry {
    fn from(record: NormalizedRecord) -> Self {
        Self {
            date: record.reference_date,
            period: record.period,
            inbound_gib: record.inbound_bytes.map(bytes_to_gib),
            outbound_gib: record.outbound_bytes.map(bytes_to_gib),
            total_gib: record.total_bytes.map(bytes_to_gib),
            rate_mbps: record.rate_bps.map(bps_to_mbps),
            inbound_bytes: record.inbound_bytes,
            outbound_bytes: record.outbound_bytes,
            total_bytes: record.total_bytes,
            rate_bps: record.rate_bps,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryView {
    pub interface: String,
    pub period: Period,
    pub data: Vec<HistoryEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthlyReportEntry {
    pub total_inbound_bytes: u64,
    pub total_outbound_bytes: u64,
    pub average_rate_bps: u64,
    pub total_inbound_tib: f64,
    pub total_outbound_tib: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthlyReportView {
    pub month: String,
    pub report: BTreeMap<String, MonthlyReportEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusView {
    pub status: &'static str,
    #[serde(flatten)]
    pub store: StoreStatus,
    pub timestamp: String,
}

/// Executes the ledger subcommands against one store
pub struct LedgerCommandHandler {
    store: SqliteUsageStore,
    config: AppConfig,
}

impl LedgerCommandHandler {
    /// Opens the configured database, registering the known interfaces
    pub fn open(config: AppConfig) -> Result<Self> {
        let store = SqliteUsageStore::open(&config.database_path, &config.known_interfaces)
            .with_context(|| {
                format!(
                    "Failed to open database at {}",
                    config.database_path.display()
                )
            })?;
        Ok(Self::with_store(store, config))
    }

    pub fn with_store(store: SqliteUsageStore, config: AppConfig) -> Self {
        Self { store, config }
    }

    pub fn handle_ingest(&self, text: &str, reject_unknown: bool) -> IngestResponse {
        let policy = if reject_unknown {
            UnknownInterfacePolicy::Reject
        } else {
            self.config.unknown_interface_policy
        };

        let result = Ingestor::new(&self.store).with_policy(policy).ingest(text);
        let response = IngestResponse::from_result(result);
        info!("{}", response.message);
        response
    }

    pub fn history(&self, interface: &str, period: Period, limit: Option<usize>) -> Result<HistoryView> {
        let limit = limit.unwrap_or(self.config.default_history_limit);
        let records = self
            .store
            .query_by_interface(interface, period, limit)
            .with_context(|| format!("Failed to read history of {interface}"))?;

        Ok(HistoryView {
            interface: interface.to_string(),
            period,
            data: records.into_iter().map(HistoryEntry::from).collect(),
        })
    }

    pub fn monthly_report(&self, month: Option<YearMonth>) -> Result<MonthlyReportView> {
        let month = month.unwrap_or_else(|| YearMonth::of(Local::now().date_naive()));
        let aggregates = self
            .store
            .aggregate_monthly(month)
            .with_context(|| format!("Failed to build report for {month}"))?;

        let report = aggregates
            .into_iter()
            .map(|(name, aggregate)| {
                let entry = MonthlyReportEntry {
                    total_inbound_bytes: aggregate.total_inbound_bytes,
                    total_outbound_bytes: aggregate.total_outbound_bytes,
                    average_rate_bps: aggregate.average_rate_bps,
                    total_inbound_tib: bytes_to_tib(aggregate.total_inbound_bytes),
                    total_outbound_tib: bytes_to_tib(aggregate.total_outbound_bytes),
                };
                (name, entry)
            })
            .collect();

        Ok(MonthlyReportView {
            month: month.to_string(),
            report,
        })
    }

    pub fn interfaces(&self) -> Result<Vec<Interface>> {
        self.store
            .list_interfaces()
            .context("Failed to list interfaces")
    }

    pub fn status(&self) -> Result<StatusView> {
        let store = self.store.status().context("Failed to read database status")?;
        Ok(StatusView {
            status: "online",
            store,
            timestamp: Local::now().to_rfc3339(),
        })
    }
}

/// Reads the report from a file, or standard input when no file is given
pub async fn read_report(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read report file {}", path.display())),
        None => {
            let mut text = String::new();
            tokio::io::stdin()
                .read_to_string(&mut text)
                .await
                .context("Failed to read report from standard input")?;
            Ok(text)
        }
    }
}

/// Human-readable rendering of an ingest response
pub fn render_summary(response: &IngestResponse) -> String {
    let mut lines = vec![response.message.clone()];
    let Some(outcome) = &response.outcome else {
        return lines.join("\n");
    };

    for record in &outcome.records {
        lines.push(format!(
            "  {:<14} {} {:<7}  in {:>12}  out {:>12}  total {:>12}  rate {:>14}",
            record.interface_name,
            record.reference_date,
            record.period,
            format_optional(record.inbound_bytes, format_bytes),
            format_optional(record.outbound_bytes, format_bytes),
            format_optional(record.total_bytes, format_bytes),
            format_optional(record.rate_bps, format_rate),
        ));
    }
    for skipped in outcome.dropped.iter().chain(&outcome.rejected) {
        lines.push(format!(
            "  skipped {} {} {}: {}",
            skipped.interface_name, skipped.reference_date, skipped.period, skipped.reason
        ));
    }
    if outcome.superseded > 0 {
        lines.push(format!(
            "  {} duplicate section(s) replaced by a later one",
            outcome.superseded
        ));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = "\
- Ontem (2024-03-15):
--- Interface WAN
Entrada: 1.00GiB
Saida: 500.00MiB
Total: 1.50GiB
Taxa de transferência média: 10.00Mbit/s
- No mês (2024-03):
--- Interface WAN
Entrada: 2.00TiB
Saida: 1.00TiB
Taxa de transferência média: 349.48Mbit/s
--- Interface LAB
Entrada: 1 GiB
";

    fn handler() -> LedgerCommandHandler {
        let config = AppConfig::default();
        let store = SqliteUsageStore::open_in_memory(&config.known_interfaces).unwrap();
        LedgerCommandHandler::with_store(store, config)
    }

    #[test]
    fn test_handle_ingest_and_history() {
        let handler = handler();
        let response = handler.handle_ingest(REPORT, false);
        assert!(response.accepted);
        assert_eq!(response.records_saved, 2);

        let history = handler.history("WAN", Period::Daily, None).unwrap();
        assert_eq!(history.data.len(), 1);
        assert_eq!(history.data[0].inbound_gib, Some(1.0));
        assert_eq!(history.data[0].rate_mbps, Some(10.0));
    }

    #[test]
    fn test_handle_ingest_reject_unknown() {
        let handler = handler();
        let response = handler.handle_ingest(REPORT, true);
        assert!(!response.accepted);
        assert_eq!(response.records_saved, 0);
        assert_eq!(handler.status().unwrap().store.total_records, 0);
    }

    #[test]
    fn test_history_of_unknown_interface_fails() {
        let handler = handler();
        assert!(handler.history("LAB", Period::Daily, None).is_err());
    }

    #[test]
    fn test_monthly_report() {
        let handler = handler();
        handler.handle_ingest(REPORT, false);

        let view = handler
            .monthly_report(Some("2024-03".parse().unwrap()))
            .unwrap();
        assert_eq!(view.month, "2024-03");
        assert_eq!(view.report.len(), 1);
        let wan = &view.report["WAN"];
        assert_eq!(wan.total_inbound_tib, 2.0);
        assert_eq!(wan.total_outbound_tib, 1.0);
        assert_eq!(wan.average_rate_bps, 349_480_000);
    }

    #[test]
    fn test_render_summary() {
        let handler = handler();
        let response = handler.handle_ingest(REPORT, false);
        let summary = render_summary(&response);
        assert!(summary.contains("2 record(s) saved"));
        assert!(summary.contains("1.00 GiB"));
        assert!(summary.contains("skipped LAB"));

        let failed = handler.handle_ingest("", false);
        assert_eq!(render_summary(&failed), "No data provided");
    }

    #[test]
    fn test_status_view_serializes_flat() {
        let handler = handler();
        let json = serde_json::to_value(handler.status().unwrap()).unwrap();
        assert_eq!(json["status"], "online");
        assert_eq!(json["total_interfaces"], 5);
        assert_eq!(json["total_records"], 0);
    }
}
