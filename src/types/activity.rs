//! Activity log rows
//!
//! Every accepted mutation leaves an audit row behind, undos included. The
//! activity log is append-only and never consulted for balances.

use super::transaction::Transaction;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of mutation an activity row records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityAction {
    Split,
    Convert,
    Contribution,
    Undo,
}

impl fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ActivityAction::Split => "Split",
            ActivityAction::Convert => "Convert",
            ActivityAction::Contribution => "Contribution",
            ActivityAction::Undo => "Undo",
        };
        f.write_str(label)
    }
}

/// One audit row: what happened and the entry it happened to
#[derive(Debug, Clone, PartialEq)]
pub struct Activity {
    pub action: ActivityAction,
    /// The appended entry, or for `Undo` the entry that was removed
    pub entry: Transaction,
}

impl Activity {
    pub fn new(action: ActivityAction, entry: Transaction) -> Self {
        Activity { action, entry }
    }
}
