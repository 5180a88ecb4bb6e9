//! Bandwidth usage report ingestion
//!
//! Parses the plain-text reports of the network monitor into per-interface
//! records, normalizes their units and stores them in SQLite for history
//! queries and monthly reports.

pub mod cli;
pub mod config;
pub mod ingest;
pub mod storage;
