//! In-memory ledger store
//!
//! Keeps a sheet in process memory behind an `Arc<Mutex<_>>`. Clones share the
//! same sheet, so a caller can hand one clone to the engine and keep another to
//! inspect what was committed or to make writes fail on purpose.

use crate::core::traits::{ensure_unchanged, LedgerStore, SheetContents, StoreFactory};
use crate::core::{AccountRegistry, SplitCatalog};
use crate::types::{Activity, LedgerError, Transaction};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct MemorySheet {
    contents: SheetContents,
    activity: Vec<Activity>,
    fail_loads: bool,
    fail_writes: bool,
    fail_activity: bool,
}

/// Ledger store held entirely in memory
#[derive(Debug, Clone)]
pub struct MemoryStore {
    sheet_id: String,
    sheet: Arc<Mutex<MemorySheet>>,
}

impl MemoryStore {
    /// Create a store for `sheet_id` preloaded with `contents`
    pub fn new(sheet_id: &str, contents: SheetContents) -> Self {
        MemoryStore {
            sheet_id: sheet_id.to_string(),
            sheet: Arc::new(Mutex::new(MemorySheet {
                contents,
                ..MemorySheet::default()
            })),
        }
    }

    /// Create a store seeded with the default roster and award table
    pub fn with_defaults(sheet_id: &str) -> Self {
        Self::new(sheet_id, default_contents())
    }

    /// Committed transactions, oldest first
    pub fn transactions(&self) -> Vec<Transaction> {
        self.inspect().contents.transactions.clone()
    }

    /// Recorded activity rows, oldest first
    pub fn activity(&self) -> Vec<Activity> {
        self.inspect().activity.clone()
    }

    /// Make `load` fail until reset
    pub fn fail_loads(&self, fail: bool) {
        self.inspect().fail_loads = fail;
    }

    /// Make `append` and `remove_last` fail until reset
    pub fn fail_writes(&self, fail: bool) {
        self.inspect().fail_writes = fail;
    }

    /// Make `record_activity` fail until reset
    pub fn fail_activity(&self, fail: bool) {
        self.inspect().fail_activity = fail;
    }

    // Test-facing accessors read through a poisoned lock rather than failing.
    fn inspect(&self) -> MutexGuard<'_, MemorySheet> {
        self.sheet.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock(&self, operation: &str) -> Result<MutexGuard<'_, MemorySheet>, LedgerError> {
        self.sheet
            .lock()
            .map_err(|_| LedgerError::persistence(operation, "memory sheet lock poisoned"))
    }
}

impl LedgerStore for MemoryStore {
    fn sheet_id(&self) -> &str {
        &self.sheet_id
    }

    fn load(&self) -> Result<SheetContents, LedgerError> {
        let sheet = self.lock("load")?;
        if sheet.fail_loads {
            return Err(LedgerError::persistence("load", "sheet unavailable"));
        }
        Ok(sheet.contents.clone())
    }

    fn append(&mut self, tx: &Transaction, expected: &[Transaction]) -> Result<(), LedgerError> {
        let mut sheet = self.lock("append")?;
        if sheet.fail_writes {
            return Err(LedgerError::persistence("append", "sheet is read-only"));
        }
        ensure_unchanged("append", &sheet.contents.transactions, expected)?;
        sheet.contents.transactions.push(tx.clone());
        Ok(())
    }

    fn remove_last(&mut self, head: &Transaction) -> Result<(), LedgerError> {
        let mut sheet = self.lock("remove_last")?;
        if sheet.fail_writes {
            return Err(LedgerError::persistence("remove_last", "sheet is read-only"));
        }
        match sheet.contents.transactions.last() {
            Some(last) if last == head => {
                sheet.contents.transactions.pop();
                Ok(())
            }
            Some(_) => Err(LedgerError::persistence(
                "remove_last",
                "stored head does not match the ledger head",
            )),
            None => Err(LedgerError::persistence("remove_last", "stored log is empty")),
        }
    }

    fn record_activity(&mut self, activity: &Activity) -> Result<(), LedgerError> {
        let mut sheet = self.lock("record_activity")?;
        if sheet.fail_activity {
            return Err(LedgerError::persistence(
                "record_activity",
                "activity log is read-only",
            ));
        }
        sheet.activity.push(activity.clone());
        Ok(())
    }
}

/// Opens in-memory sheets, creating them from a template on first use
///
/// Reopening a sheet id returns a store sharing the sheet created earlier.
#[derive(Debug)]
pub struct MemoryStoreFactory {
    template: SheetContents,
    sheets: Mutex<HashMap<String, MemoryStore>>,
}

impl MemoryStoreFactory {
    /// Factory whose fresh sheets start as copies of `template`
    pub fn new(template: SheetContents) -> Self {
        MemoryStoreFactory {
            template,
            sheets: Mutex::new(HashMap::new()),
        }
    }

    /// Register a prepared store under its sheet id
    pub fn insert(&self, store: MemoryStore) {
        self.sheets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(store.sheet_id.clone(), store);
    }
}

impl Default for MemoryStoreFactory {
    fn default() -> Self {
        Self::new(default_contents())
    }
}

impl StoreFactory for MemoryStoreFactory {
    fn open(&self, sheet_id: &str) -> Result<Box<dyn LedgerStore>, LedgerError> {
        let mut sheets = self
            .sheets
            .lock()
            .map_err(|_| LedgerError::persistence("open", "sheet registry lock poisoned"))?;
        let store = sheets
            .entry(sheet_id.to_string())
            .or_insert_with(|| MemoryStore::new(sheet_id, self.template.clone()))
            .clone();
        Ok(Box::new(store))
    }
}

/// Default roster and award table with an empty log
pub fn default_contents() -> SheetContents {
    SheetContents {
        names: AccountRegistry::with_defaults().names().to_vec(),
        awards: SplitCatalog::with_defaults()
            .awards()
            .map(|(pattern, payout)| (pattern.to_string(), payout))
            .collect(),
        transactions: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn tx(creditor: &str) -> Transaction {
        Transaction::new(creditor, "Pot", Decimal::ONE, "7-9", Utc::now())
    }

    #[test]
    fn test_clones_share_the_sheet() {
        let store = MemoryStore::with_defaults("s");
        let mut writer = store.clone();
        writer.append(&tx("Alice"), &[]).unwrap();
        assert_eq!(store.transactions().len(), 1);
    }

    #[test]
    fn test_append_refuses_stale_view() {
        let mut first = MemoryStore::with_defaults("s");
        let mut second = first.clone();
        let entry = tx("Alice");
        first.append(&entry, &[]).unwrap();

        // Both writers saw the empty log; only the first may extend it
        let err = second.append(&tx("Bob"), &[]).unwrap_err();
        assert!(err.is_persistence());
        assert_eq!(first.transactions(), vec![entry.clone()]);

        second.append(&tx("Bob"), &[entry]).unwrap();
        assert_eq!(first.transactions().len(), 2);
    }

    #[test]
    fn test_remove_last_checks_head() {
        let mut store = MemoryStore::with_defaults("s");
        store.append(&tx("Alice"), &[]).unwrap();

        let err = store.remove_last(&tx("Bob")).unwrap_err();
        assert!(err.is_persistence());
        assert_eq!(store.transactions().len(), 1);
    }

    #[test]
    fn test_fail_loads() {
        let store = MemoryStore::with_defaults("s");
        store.fail_loads(true);
        assert!(store.load().unwrap_err().is_persistence());
        store.fail_loads(false);
        assert!(store.load().is_ok());
    }

    #[test]
    fn test_factory_reopens_same_sheet() {
        let factory = MemoryStoreFactory::default();
        let mut first = factory.open("a").unwrap();
        first.append(&tx("Alice"), &[]).unwrap();

        let second = factory.open("a").unwrap();
        assert_eq!(second.load().unwrap().transactions.len(), 1);

        let other = factory.open("b").unwrap();
        assert!(other.load().unwrap().transactions.is_empty());
        assert_eq!(other.sheet_id(), "b");
    }

    #[test]
    fn test_default_contents_include_pot() {
        let contents = default_contents();
        assert!(contents.names.iter().any(|n| n == "Pot"));
        assert!(!contents.awards.is_empty());
    }
}
