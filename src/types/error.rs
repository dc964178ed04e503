//! Error types for the split ledger
//!
//! Every rejected command maps to exactly one variant so callers can branch on
//! the kind of failure without parsing messages.
//!
//! # Error Categories
//!
//! - **Validation Errors**: unknown player, unknown split, no open split, empty ledger,
//!   bad amounts and bad sheet ids. These never touch the log.
//! - **Persistence Errors**: the store rejected a read or a commit. When raised by a
//!   mutation, the in-memory change has already been rolled back.

use rust_decimal::Decimal;
use thiserror::Error;

/// Main error type for the ledger engine and its stores
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// The name is the Pot or is not on the roster
    #[error("'{name}' is not a player")]
    InvalidPlayer {
        /// The rejected name
        name: String,
    },

    /// The pattern is malformed or not in the split catalog
    #[error("'{pattern}' is not a recognized split")]
    InvalidSplit {
        /// The rejected pattern
        pattern: String,
    },

    /// Conversion requested with no open split entry for the player and pattern
    #[error("{name} has no open '{pattern}' split to convert")]
    NoMatchingSplit {
        /// Player name
        name: String,
        /// Split pattern
        pattern: String,
    },

    /// Undo requested on an empty log
    #[error("The ledger has no transactions to remove")]
    EmptyLedger,

    /// A contribution or payout amount is not acceptable
    #[error("Invalid amount {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: Decimal,
    },

    /// The sheet id cannot name a backing store
    #[error("Invalid sheet id '{sheet_id}'")]
    InvalidSheetId {
        /// The rejected id
        sheet_id: String,
    },

    /// The backing store failed to load or commit
    #[error("Persistence failure during {operation}: {message}")]
    PersistenceFailure {
        /// Store operation that failed
        operation: String,
        /// Underlying error description
        message: String,
    },
}

impl From<std::io::Error> for LedgerError {
    fn from(error: std::io::Error) -> Self {
        LedgerError::persistence("io", error)
    }
}

impl From<csv::Error> for LedgerError {
    fn from(error: csv::Error) -> Self {
        let operation = match error.position() {
            Some(pos) => format!("csv line {}", pos.line()),
            None => "csv".to_string(),
        };
        LedgerError::PersistenceFailure {
            operation,
            message: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(error: serde_json::Error) -> Self {
        LedgerError::persistence("json", error)
    }
}

// Helper functions for creating common errors

impl LedgerError {
    /// Create an InvalidPlayer error
    pub fn invalid_player(name: &str) -> Self {
        LedgerError::InvalidPlayer {
            name: name.to_string(),
        }
    }

    /// Create an InvalidSplit error
    pub fn invalid_split(pattern: &str) -> Self {
        LedgerError::InvalidSplit {
            pattern: pattern.to_string(),
        }
    }

    /// Create a NoMatchingSplit error
    pub fn no_matching_split(name: &str, pattern: &str) -> Self {
        LedgerError::NoMatchingSplit {
            name: name.to_string(),
            pattern: pattern.to_string(),
        }
    }

    /// Create an InvalidAmount error
    pub fn invalid_amount(amount: Decimal) -> Self {
        LedgerError::InvalidAmount { amount }
    }

    /// Create an InvalidSheetId error
    pub fn invalid_sheet_id(sheet_id: &str) -> Self {
        LedgerError::InvalidSheetId {
            sheet_id: sheet_id.to_string(),
        }
    }

    /// Create a PersistenceFailure error
    pub fn persistence(operation: &str, message: impl std::fmt::Display) -> Self {
        LedgerError::PersistenceFailure {
            operation: operation.to_string(),
            message: message.to_string(),
        }
    }

    /// Whether the failure came from the store rather than validation
    pub fn is_persistence(&self) -> bool {
        matches!(self, LedgerError::PersistenceFailure { .. })
    }
}
