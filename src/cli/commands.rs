use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::ingest::{Period, YearMonth};

/// Main CLI structure for the bandwidth-ledger application
#[derive(Parser)]
#[command(version)] // Automatically uses version from Cargo.toml
#[command(about = "Bandwidth Ledger - ingest bandwidth usage reports and query per-interface traffic history")]
#[command(long_about = "Bandwidth Ledger reads the plain-text usage reports of the network monitor, \
converts their volumes and rates into bytes and bits per second, and keeps them in a SQLite database \
for history queries and monthly reports.")]
pub struct Cli {
    /// Configuration file (TOML); defaults to ./bandwidth-ledger.toml when present
    #[arg(short, long, global = true, help = "Configuration file path")]
    pub config: Option<PathBuf>,

    /// Overrides the database path from the configuration
    #[arg(short, long, global = true, help = "SQLite database path")]
    pub database: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Parse a usage report and store its records
    #[command(about = "Ingest a usage report")]
    #[command(long_about = "Reads a usage report from a file or standard input, extracts the figures of \
every known interface and stores them. Records with the same interface, date and period replace \
the stored ones.\n\n\
Examples:\n  \
bwl ingest --file report.txt          # Ingest a saved report\n  \
cat report.txt | bwl ingest           # Ingest from standard input\n  \
bwl ingest -f report.txt --summary    # Print a readable summary instead of JSON\n  \
bwl ingest -f report.txt --reject-unknown  # Fail on unregistered interfaces")]
    Ingest {
        /// Report file; standard input when omitted
        #[arg(short, long, help = "Report file to ingest (reads stdin when omitted)")]
        file: Option<PathBuf>,

        /// Fail the whole report when it names an unregistered interface
        #[arg(long, help = "Reject the report if it names an unknown interface")]
        reject_unknown: bool,

        #[arg(short, long, help = "Print a readable summary instead of JSON")]
        summary: bool,
    },

    /// Stored figures of one interface, most recent first
    #[command(about = "Show usage history of an interface")]
    History {
        /// Interface name, e.g. WAN
        interface: String,

        #[arg(
            short,
            long,
            default_value = "daily",
            help = "Period: daily or monthly"
        )]
        period: Period,

        #[arg(short, long, help = "Maximum number of records (default from configuration)")]
        limit: Option<usize>,
    },

    /// Per-interface totals for one month
    #[command(about = "Generate the monthly usage report")]
    Report {
        #[arg(short, long, help = "Month as YYYY-MM (defaults to the current month)")]
        month: Option<YearMonth>,
    },

    /// Registered interfaces
    #[command(about = "List known interfaces")]
    Interfaces,

    /// Store-wide counters
    #[command(about = "Show database status")]
    Status,
}
