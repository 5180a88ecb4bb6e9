use chrono::NaiveDate;
use log::{debug, info};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use crate::ingest::records::{NormalizedRecord, Period, YearMonth};
use crate::storage::errors::StorageError;
use crate::storage::models::{
    Interface, InterfaceRegistry, MonthlyAggregate, StoreStatus, UsageStore,
};
use crate::storage::schema::{create_tables, seed_interfaces};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// SQLite-backed interface registry and usage store
pub struct SqliteUsageStore {
    conn: Mutex<Connection>,
}

impl SqliteUsageStore {
    /// Opens (or creates) the database file and registers `known_interfaces`
    pub fn open<P: AsRef<Path>, S: AsRef<str>>(
        db_path: P,
        known_interfaces: &[S],
    ) -> Result<Self, StorageError> {
        // Ensure the parent directory exists
        if let Some(parent) = db_path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(db_path.as_ref())?;

        // WAL lets history queries read while an ingestion commits
        let _ = conn.pragma_update(None, "journal_mode", "WAL");
        conn.busy_timeout(Duration::from_secs(5))?;

        let store = Self::initialize(conn, known_interfaces)?;
        info!("Usage store opened at {}", db_path.as_ref().display());
        Ok(store)
    }

    pub fn open_in_memory<S: AsRef<str>>(known_interfaces: &[S]) -> Result<Self, StorageError> {
        Self::initialize(Connection::open_in_memory()?, known_interfaces)
    }

    fn initialize<S: AsRef<str>>(
        mut conn: Connection,
        known_interfaces: &[S],
    ) -> Result<Self, StorageError> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        create_tables(&conn)?;

        let tx = conn.transaction()?;
        let seeded = seed_interfaces(&tx, known_interfaces)?;
        tx.commit()?;
        debug!("Registered {seeded} new interface(s)");

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn.lock().map_err(|_| StorageError::LockPoisoned)
    }
}

fn interface_id(conn: &Connection, name: &str) -> Result<Option<i64>, StorageError> {
    let id = conn
        .query_row(
            "SELECT id FROM interfaces WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )
        .optional()?;
    Ok(id)
}

fn interface_from_row(row: &Row<'_>) -> rusqlite::Result<Interface> {
    Ok(Interface {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        created_at: row.get(3)?,
    })
}

/// Stored text back into the record's typed date and period
fn parse_stored(date: &str, period: &str) -> Result<(NaiveDate, Period), StorageError> {
    let date = NaiveDate::parse_from_str(date, DATE_FORMAT)
        .map_err(|e| StorageError::InvalidRow(format!("reference date '{date}': {e}")))?;
    let period = period.parse::<Period>().map_err(StorageError::InvalidRow)?;
    Ok((date, period))
}

impl InterfaceRegistry for SqliteUsageStore {
    fn lookup(&self, name: &str) -> Result<Option<Interface>, StorageError> {
        let conn = self.lock()?;
        let interface = conn
            .query_row(
                "SELECT id, name, description, created_at FROM interfaces WHERE name = ?1",
                params![name],
                interface_from_row,
            )
            .optional()?;
        Ok(interface)
    }

    fn list_interfaces(&self) -> Result<Vec<Interface>, StorageError> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare("SELECT id, name, description, created_at FROM interfaces ORDER BY name")?;
        let rows = stmt.query_map([], interface_from_row)?;
        let interfaces: Result<Vec<_>, _> = rows.collect();
        Ok(interfaces?)
    }
}

impl UsageStore for SqliteUsageStore {
    fn upsert_batch(&self, records: &[NormalizedRecord]) -> Result<usize, StorageError> {
        let mut conn = self.lock()?;
        // Dropped without commit on any early return, which rolls back
        let tx = conn.transaction()?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO bandwidth_usage (
                    interface_id, reference_date, period,
                    inbound_bytes, outbound_bytes, total_bytes, rate_bps
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                ON CONFLICT (interface_id, reference_date, period) DO UPDATE SET
                    inbound_bytes = excluded.inbound_bytes,
                    outbound_bytes = excluded.outbound_bytes,
                    total_bytes = excluded.total_bytes,
                    rate_bps = excluded.rate_bps,
                    updated_at = CURRENT_TIMESTAMP",
            )?;

            for record in records {
                let id = interface_id(&tx, &record.interface_name)?
                    .ok_or_else(|| StorageError::InterfaceNotFound(record.interface_name.clone()))?;

                stmt.execute(params![
                    id,
                    record.reference_date.format(DATE_FORMAT).to_string(),
                    record.period.as_str(),
                    record.inbound_bytes,
                    record.outbound_bytes,
                    record.total_bytes,
                    record.rate_bps,
                ])?;
            }
        }

        tx.commit()?;
        debug!("Committed {} usage record(s)", records.len());
        Ok(records.len())
    }

    fn query_by_interface(
        &self,
        interface: &str,
        period: Period,
        limit: usize,
    ) -> Result<Vec<NormalizedRecord>, StorageError> {
        let conn = self.lock()?;
        let id = interface_id(&conn, interface)?
            .ok_or_else(|| StorageError::InterfaceNotFound(interface.to_string()))?;

        let mut stmt = conn.prepare(
            "SELECT reference_date, period, inbound_bytes, outbound_bytes, total_bytes, rate_bps
             FROM bandwidth_usage
             WHERE interface_id = ?1 AND period = ?2
             ORDER BY reference_date DESC
             LIMIT ?3",
        )?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = stmt.query_map(params![id, period.as_str(), limit], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<u64>>(2)?,
                row.get::<_, Option<u64>>(3)?,
                row.get::<_, Option<u64>>(4)?,
                row.get::<_, Option<u64>>(5)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (date, stored_period, inbound, outbound, total, rate) = row?;
            let (reference_date, period) = parse_stored(&date, &stored_period)?;
            records.push(NormalizedRecord {
                interface_name: interface.to_string(),
                reference_date,
                period,
                inbound_bytes: inbound,
                outbound_bytes: outbound,
                total_bytes: total,
                rate_bps: rate,
            });
        }
        Ok(records)
    }

    fn aggregate_monthly(
        &self,
        month: YearMonth,
    ) -> Result<BTreeMap<String, MonthlyAggregate>, StorageError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT i.name,
                    COALESCE(SUM(u.inbound_bytes), 0),
                    COALESCE(SUM(u.outbound_bytes), 0),
                    AVG(u.rate_bps)
             FROM bandwidth_usage u
             JOIN interfaces i ON u.interface_id = i.id
             WHERE u.period = 'monthly'
               AND strftime('%Y-%m', u.reference_date) = ?1
             GROUP BY i.name",
        )?;

        let rows = stmt.query_map(params![month.to_string()], |row| {
            let average: Option<f64> = row.get(3)?;
            Ok((
                row.get::<_, String>(0)?,
                MonthlyAggregate {
                    total_inbound_bytes: row.get(1)?,
                    total_outbound_bytes: row.get(2)?,
                    average_rate_bps: average.map(|avg| avg.trunc() as u64).unwrap_or(0),
                },
            ))
        })?;

        let mut report = BTreeMap::new();
        for row in rows {
            let (name, aggregate) = row?;
            report.insert(name, aggregate);
        }
        Ok(report)
    }

    fn status(&self) -> Result<StoreStatus, StorageError> {
        let conn = self.lock()?;
        let total_interfaces: u64 =
            conn.query_row("SELECT COUNT(*) FROM interfaces", [], |row| row.get(0))?;
        let (total_records, last_update): (u64, Option<String>) = conn.query_row(
            "SELECT COUNT(*), MAX(updated_at) FROM bandwidth_usage",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        Ok(StoreStatus {
            total_interfaces,
            total_records,
            last_update,
        })
    }
}
