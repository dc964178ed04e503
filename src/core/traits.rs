//! Persistence traits for the ledger engine
//!
//! The engine never touches a storage medium directly. It loads a sheet through a
//! [`LedgerStore`] and commits each accepted mutation to it before reporting
//! success. Stores are opened by sheet id through a [`StoreFactory`], which is what
//! lets the backing sheet be switched at runtime.

use crate::types::{Activity, LedgerError, Transaction};
use rust_decimal::Decimal;

/// Everything the engine needs from a sheet at load time
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetContents {
    /// Roster names in stored order (the Pot may or may not be listed)
    pub names: Vec<String>,
    /// `(pattern, payout)` pairs of the split catalog
    pub awards: Vec<(String, Decimal)>,
    /// The full transaction log, oldest first
    pub transactions: Vec<Transaction>,
}

/// Durable backing store for one sheet
///
/// Every method is synchronous and returns only after the change is durable (or
/// has failed). Implementations must leave the durable log unchanged when they
/// return an error from `append` or `remove_last`.
///
/// Several engines may hold the same sheet, e.g. one per CLI invocation. Writes
/// carry the caller's view of the log and are refused once another writer has
/// moved the stored log past it.
pub trait LedgerStore: Send + Sync {
    /// Identifier of the sheet this store is bound to
    fn sheet_id(&self) -> &str;

    /// Load the roster, catalog, and full ordered log
    fn load(&self) -> Result<SheetContents, LedgerError>;

    /// Durably append `tx` as the new head of the log
    ///
    /// `expected` is the log `tx` was validated against. The append fails with
    /// `PersistenceFailure` if the stored log no longer matches it.
    fn append(&mut self, tx: &Transaction, expected: &[Transaction]) -> Result<(), LedgerError>;

    /// Durably remove the head of the log, which must equal `head`
    fn remove_last(&mut self, head: &Transaction) -> Result<(), LedgerError>;

    /// Append an audit row to the activity log
    fn record_activity(&mut self, activity: &Activity) -> Result<(), LedgerError>;
}

/// Opens stores by sheet id
pub trait StoreFactory: Send + Sync {
    /// Open (creating if needed) the store for `sheet_id`
    fn open(&self, sheet_id: &str) -> Result<Box<dyn LedgerStore>, LedgerError>;
}

/// Refuse a write if `stored` is no longer the log the caller loaded
pub fn ensure_unchanged(
    operation: &str,
    stored: &[Transaction],
    expected: &[Transaction],
) -> Result<(), LedgerError> {
    if stored.len() == expected.len() && stored.last() == expected.last() {
        return Ok(());
    }
    Err(LedgerError::persistence(
        operation,
        format!(
            "sheet changed since it was loaded ({} entries stored, {} expected)",
            stored.len(),
            expected.len()
        ),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn tx(creditor: &str, cents: i64) -> Transaction {
        Transaction::new(creditor, "Pot", Decimal::new(cents, 2), "7-9", Utc::now())
    }

    #[test]
    fn test_unchanged_log_accepted() {
        let log = vec![tx("Alice", 500), tx("Bob", 500)];
        assert!(ensure_unchanged("append", &log, &log.clone()).is_ok());
        assert!(ensure_unchanged("append", &[], &[]).is_ok());
    }

    #[test]
    fn test_moved_log_refused() {
        let seen = vec![tx("Alice", 500)];
        let grown = vec![tx("Alice", 500), tx("Bob", 500)];
        let replaced = vec![tx("Bob", 2000)];

        for stored in [&grown[..], &replaced[..], &[][..]] {
            let err = ensure_unchanged("append", stored, &seen).unwrap_err();
            assert!(err.is_persistence());
        }
    }
}
