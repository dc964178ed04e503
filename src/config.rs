//! Resolved runtime configuration

use crate::cli::{CliArgs, OutputFormat};
use std::path::PathBuf;

/// Settings file name inside the data directory
pub const SETTINGS_FILE: &str = "store.json";

/// Paths and options the binary runs with
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerConfig {
    pub data_dir: PathBuf,
    pub settings_path: PathBuf,
    pub log_filter: String,
    pub format: OutputFormat,
}

impl LedgerConfig {
    /// Resolve defaults that depend on other arguments
    pub fn from_args(args: &CliArgs) -> Self {
        let settings_path = args
            .settings
            .clone()
            .unwrap_or_else(|| args.data_dir.join(SETTINGS_FILE));

        LedgerConfig {
            data_dir: args.data_dir.clone(),
            settings_path,
            log_filter: args.log_level.clone(),
            format: args.format,
        }
    }
}
