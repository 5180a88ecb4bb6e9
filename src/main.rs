use anyhow::{bail, Result};
use bandwidth_ledger::cli::commands::Commands;
use bandwidth_ledger::cli::ledger_commands::{read_report, render_summary};
use bandwidth_ledger::cli::{Cli, LedgerCommandHandler};
use bandwidth_ledger::config::AppConfig;
use clap::Parser;
use serde::Serialize;

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(database) = cli.database {
        config.database_path = database;
    }

    let handler = LedgerCommandHandler::open(config)?;

    match cli.command {
        Commands::Ingest {
            file,
            reject_unknown,
            summary,
        } => {
            let text = read_report(file.as_deref()).await?;
            let response = handler.handle_ingest(&text, reject_unknown);

            if summary {
                println!("{}", render_summary(&response));
            } else {
                print_json(&response)?;
            }

            if !response.accepted {
                bail!("{}", response.message);
            }
        }
        Commands::History {
            interface,
            period,
            limit,
        } => {
            print_json(&handler.history(&interface, period, limit)?)?;
        }
        Commands::Report { month } => {
            print_json(&handler.monthly_report(month)?)?;
        }
        Commands::Interfaces => {
            print_json(&handler.interfaces()?)?;
        }
        Commands::Status => {
            print_json(&handler.status()?)?;
        }
    }

    Ok(())
}
