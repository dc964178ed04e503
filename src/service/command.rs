//! Commands accepted by the ledger service and their results

use crate::types::{Balance, Transaction};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeSet;

/// One request against the ledger
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Derived balances of every account, Pot included
    Balances,
    /// Account names, Pot included
    Names,
    /// The `count` most recent transactions, most recent first
    Transactions { count: i64 },
    /// Pay `name` the award for `split_string` out of the Pot
    CreateSplit { name: String, split_string: String },
    /// Settle the most recent open `split_string` split of `name`
    ConvertSplit { name: String, split_string: String },
    /// `name` pays `amount` into the Pot
    Contribute { name: String, amount: Decimal },
    /// Undo the most recent transaction
    RemoveLastTransaction,
    /// Recognized split patterns
    GetValidSplits,
    /// Split entries not yet settled, oldest first
    OpenSplits,
    /// Currently selected sheet
    GetSheetId,
    /// Switch to another sheet
    SetSheetId { sheet_id: String },
    /// Switch to the demo sheet
    SetDemoSheetId,
}

impl Command {
    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Command::Balances => "balances",
            Command::Names => "names",
            Command::Transactions { .. } => "transactions",
            Command::CreateSplit { .. } => "create_split",
            Command::ConvertSplit { .. } => "convert_split",
            Command::Contribute { .. } => "contribute",
            Command::RemoveLastTransaction => "remove_last_transaction",
            Command::GetValidSplits => "get_valid_splits",
            Command::OpenSplits => "open_splits",
            Command::GetSheetId => "get_sheet_id",
            Command::SetSheetId { .. } => "set_sheet_id",
            Command::SetDemoSheetId => "set_demo_sheet_id",
        }
    }

    /// Whether the command needs exclusive access to the ledger
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Command::CreateSplit { .. }
                | Command::ConvertSplit { .. }
                | Command::Contribute { .. }
                | Command::RemoveLastTransaction
                | Command::SetSheetId { .. }
                | Command::SetDemoSheetId
        )
    }
}

/// Result of a command
///
/// Serializes untagged, so callers see the bare payload and `null` for `Done`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CommandOutput {
    Balances(Vec<Balance>),
    Names(Vec<String>),
    Transactions(Vec<Transaction>),
    ValidSplits(BTreeSet<String>),
    SheetId(String),
    Done,
}
