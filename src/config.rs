//! Application configuration
//!
//! Settings come from an optional TOML file followed by `BWL_`-prefixed
//! environment variables; anything not set falls back to the defaults below.
//!
//! ```toml
//! database_path = "/var/lib/bandwidth/bandwidth.db"
//! known_interfaces = ["WAN", "CAMPUS", "DI"]
//! unknown_interface_policy = "reject"
//! default_history_limit = 60
//! ```

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use log::debug;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::ingest::UnknownInterfacePolicy;
use crate::storage::schema::DEFAULT_INTERFACES;

/// Configuration file read when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "bandwidth-ledger.toml";

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub known_interfaces: Vec<String>,
    pub unknown_interface_policy: UnknownInterfacePolicy,
    pub default_history_limit: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("bandwidth.db"),
            known_interfaces: DEFAULT_INTERFACES.iter().map(|s| s.to_string()).collect(),
            unknown_interface_policy: UnknownInterfacePolicy::Drop,
            default_history_limit: 30,
        }
    }
}

impl AppConfig {
    /// Loads configuration; an explicitly named file must exist
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let file_source = match config_file {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let settings = Config::builder()
            .add_source(file_source)
            .add_source(
                Environment::with_prefix("BWL")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("known_interfaces"),
            )
            .build()
            .context("Failed to read configuration")?;

        let app_config: AppConfig = settings
            .try_deserialize()
            .context("Invalid configuration")?;
        debug!("Loaded configuration: {app_config:?}");
        Ok(app_config)
    }
}
