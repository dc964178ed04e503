use crate::service::Command;
use clap::{Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use std::path::PathBuf;

/// Default directory holding one subdirectory per sheet
pub const DEFAULT_DATA_DIR: &str = "./ledger-data";

/// Track split payouts owed by the pot
#[derive(Parser, Debug)]
#[command(name = "split-ledger")]
#[command(about = "Track bowling split payouts owed by the pot", long_about = None)]
pub struct CliArgs {
    /// Directory containing the sheets
    #[arg(
        long = "data-dir",
        value_name = "DIR",
        env = "SPLIT_LEDGER_DATA_DIR",
        default_value = DEFAULT_DATA_DIR,
        global = true
    )]
    pub data_dir: PathBuf,

    /// Settings file naming the selected sheet
    #[arg(
        long = "settings",
        value_name = "FILE",
        global = true,
        help = "Settings file (default: <DATA_DIR>/store.json)"
    )]
    pub settings: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long = "log-level", value_name = "FILTER", default_value = "info", global = true)]
    pub log_level: String,

    /// Output format for command results
    #[arg(long = "format", value_name = "FORMAT", default_value = "json", global = true)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: LedgerCommand,
}

/// Available output formats
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Csv,
}

/// One subcommand per ledger command
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum LedgerCommand {
    /// Print every account balance
    Balances,
    /// Print account names, Pot included
    Names,
    /// Print the most recent transactions
    Transactions {
        #[arg(value_name = "COUNT", default_value_t = 10, allow_negative_numbers = true)]
        count: i64,
    },
    /// Record a split paid out of the pot
    CreateSplit {
        #[arg(value_name = "NAME")]
        name: String,
        #[arg(value_name = "SPLIT", help = "Split pattern, e.g. 7-10")]
        split: String,
    },
    /// Settle a player's most recent open split
    ConvertSplit {
        #[arg(value_name = "NAME")]
        name: String,
        #[arg(value_name = "SPLIT")]
        split: String,
    },
    /// Record a player paying into the pot
    Contribute {
        #[arg(value_name = "NAME")]
        name: String,
        #[arg(value_name = "AMOUNT")]
        amount: Decimal,
    },
    /// Undo the most recent transaction
    RemoveLastTransaction,
    /// Print the recognized split patterns
    GetValidSplits,
    /// Print split entries not yet settled
    OpenSplits,
    /// Print the selected sheet id
    GetSheetId,
    /// Select another sheet
    SetSheetId {
        #[arg(value_name = "SHEET_ID")]
        sheet_id: String,
    },
    /// Select the demo sheet
    SetDemoSheetId,
}

impl LedgerCommand {
    /// Convert into the service command
    pub fn into_command(self) -> Command {
        match self {
            LedgerCommand::Balances => Command::Balances,
            LedgerCommand::Names => Command::Names,
            LedgerCommand::Transactions { count } => Command::Transactions { count },
            LedgerCommand::CreateSplit { name, split } => Command::CreateSplit {
                name,
                split_string: split,
            },
            LedgerCommand::ConvertSplit { name, split } => Command::ConvertSplit {
                name,
                split_string: split,
            },
            LedgerCommand::Contribute { name, amount } => Command::Contribute { name, amount },
            LedgerCommand::RemoveLastTransaction => Command::RemoveLastTransaction,
            LedgerCommand::GetValidSplits => Command::GetValidSplits,
            LedgerCommand::OpenSplits => Command::OpenSplits,
            LedgerCommand::GetSheetId => Command::GetSheetId,
            LedgerCommand::SetSheetId { sheet_id } => Command::SetSheetId { sheet_id },
            LedgerCommand::SetDemoSheetId => Command::SetDemoSheetId,
        }
    }
}
