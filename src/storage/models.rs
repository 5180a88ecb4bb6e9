//! Stored entities and the interfaces the ingestion pipeline writes through

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ingest::records::{NormalizedRecord, Period, YearMonth};
use crate::storage::errors::StorageError;

/// A pre-registered network interface; its name is the natural key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interface {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: String,
}

/// Monthly totals for one interface
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyAggregate {
    pub total_inbound_bytes: u64,
    pub total_outbound_bytes: u64,
    pub average_rate_bps: u64,
}

/// Store-wide counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStatus {
    pub total_interfaces: u64,
    pub total_records: u64,
    /// Timestamp of the most recent write, if any record exists
    pub last_update: Option<String>,
}

/// Lookup of the known interface set
///
/// The set is seeded at initialization and never grows from parsed reports.
pub trait InterfaceRegistry {
    fn lookup(&self, name: &str) -> Result<Option<Interface>, StorageError>;

    fn list_interfaces(&self) -> Result<Vec<Interface>, StorageError>;
}

/// Persistence of normalized usage records
pub trait UsageStore {
    /// Writes all records in one transaction, keyed by interface, reference
    /// date and period. A record with an existing key replaces the stored one
    /// in full. Returns the number of records written.
    fn upsert_batch(&self, records: &[NormalizedRecord]) -> Result<usize, StorageError>;

    /// Records of one interface and period, most recent reference date first
    fn query_by_interface(
        &self,
        interface: &str,
        period: Period,
        limit: usize,
    ) -> Result<Vec<NormalizedRecord>, StorageError>;

    /// Per-interface sums of inbound and outbound bytes and the average rate
    /// over the monthly records of `month`
    fn aggregate_monthly(
        &self,
        month: YearMonth,
    ) -> Result<BTreeMap<String, MonthlyAggregate>, StorageError>;

    fn status(&self) -> Result<StoreStatus, StorageError>;
}
