pub mod commands;
pub mod ledger_commands;

pub use commands::Cli;
pub use ledger_commands::LedgerCommandHandler;
