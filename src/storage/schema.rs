use rusqlite::{params, Connection, Transaction};

use crate::storage::errors::StorageError;

/// Interfaces registered when no configuration overrides the list
pub const DEFAULT_INTERFACES: [&str; 5] = ["WAN", "CAMPUS", "DI", "ETICE_NUVENS", "ETICE_GOV"];

pub fn create_tables(conn: &Connection) -> Result<(), StorageError> {
    // Known interfaces, seeded once
    conn.execute(
        "CREATE TABLE IF NOT EXISTS interfaces (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT UNIQUE NOT NULL,
            description TEXT,
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    // One row per interface, reference date and period
    conn.execute(
        "CREATE TABLE IF NOT EXISTS bandwidth_usage (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            interface_id INTEGER NOT NULL,
            reference_date DATE NOT NULL,
            period TEXT NOT NULL CHECK (period IN ('daily', 'monthly')),
            inbound_bytes INTEGER,
            outbound_bytes INTEGER,
            total_bytes INTEGER,
            rate_bps INTEGER,
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY (interface_id) REFERENCES interfaces (id),
            UNIQUE (interface_id, reference_date, period)
        )",
        [],
    )?;

    create_indexes(conn)?;

    Ok(())
}

fn create_indexes(conn: &Connection) -> Result<(), StorageError> {
    // History queries filter by period and order by date
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_bandwidth_usage_period_date
         ON bandwidth_usage(period, reference_date)",
        [],
    )?;

    Ok(())
}

/// Registers the known interfaces; existing names are left untouched
pub fn seed_interfaces<S: AsRef<str>>(tx: &Transaction, names: &[S]) -> Result<usize, StorageError> {
    let mut stmt = tx.prepare("INSERT OR IGNORE INTO interfaces (name) VALUES (?1)")?;
    let mut inserted = 0;
    for name in names {
        inserted += stmt.execute(params![name.as_ref()])?;
    }
    Ok(inserted)
}
