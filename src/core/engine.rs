//! Ledger engine
//!
//! This module provides the `LedgerEngine` that orchestrates ledger mutations by
//! coordinating between the AccountRegistry, SplitCatalog, TransactionLog, and the
//! sheet's LedgerStore.
//!
//! The engine enforces business rules such as:
//! - Only players (never the Pot) receive split payouts or contribute
//! - Split patterns must be in the catalog
//! - A split entry is settled at most once, most recent open entry first
//! - Only the head of the log can be removed
//!
//! The in-memory log only changes once the store has accepted the change, so it
//! never runs ahead of the durable one. Running balances are kept inside the
//! `Decimal` range: a mutation that would overflow one is refused.

use crate::core::account_registry::AccountRegistry;
use crate::core::balance;
use crate::core::split_catalog::SplitCatalog;
use crate::core::traits::LedgerStore;
use crate::core::transaction_log::TransactionLog;
use crate::types::{
    Activity, ActivityAction, Balance, LedgerError, Transaction, POT,
};
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, error, info, warn};

const BALANCE_OVERFLOW: &str = "running balances leave the decimal range";

/// Split ledger engine bound to one sheet
pub struct LedgerEngine {
    registry: AccountRegistry,
    catalog: SplitCatalog,
    log: TransactionLog,
    store: Box<dyn LedgerStore>,
}

impl LedgerEngine {
    /// Load a sheet from `store` and build an engine over it
    ///
    /// Cached `pot_amount` values that disagree with the log are reported but
    /// otherwise ignored; balances are always recomputed.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceFailure` if the store cannot be read, its award table
    /// is malformed, or its log does not replay within the `Decimal` range.
    pub fn open(store: Box<dyn LedgerStore>) -> Result<Self, LedgerError> {
        let contents = store.load()?;

        let registry = AccountRegistry::new(&contents.names);
        let catalog = SplitCatalog::new(contents.awards)
            .map_err(|e| LedgerError::persistence("load split awards", e))?;
        let log = TransactionLog::from(contents.transactions);

        let names = registry.names().iter().map(String::as_str);
        if balance::compute_balances(names, log.entries()).is_none() {
            return Err(LedgerError::persistence("load transactions", BALANCE_OVERFLOW));
        }

        let stale = balance::stale_pot_snapshots(log.entries()).unwrap_or_default();
        if let Some(first) = stale.first() {
            warn!(
                sheet_id = store.sheet_id(),
                stale = stale.len(),
                first_index = first,
                "cached pot amounts disagree with the log"
            );
        }

        info!(
            sheet_id = store.sheet_id(),
            accounts = registry.names().len(),
            splits = catalog.len(),
            transactions = log.len(),
            "ledger loaded"
        );

        Ok(LedgerEngine {
            registry,
            catalog,
            log,
            store,
        })
    }

    /// Record a split payout from the Pot to `name`
    ///
    /// # Errors
    ///
    /// - `InvalidPlayer` if `name` is the Pot or not on the roster
    /// - `InvalidSplit` if `pattern` is not in the catalog
    /// - `InvalidAmount` if the payout would overflow a balance
    /// - `PersistenceFailure` if the store rejects the commit
    pub fn create_split(&mut self, name: &str, pattern: &str) -> Result<Transaction, LedgerError> {
        self.require_player(name)?;

        let payout = self.catalog.payout(pattern).ok_or_else(|| {
            debug!(name, pattern, "create_split rejected: unknown split");
            LedgerError::invalid_split(pattern)
        })?;

        let entry = Transaction::new(name, POT, payout, pattern, Utc::now());
        self.commit_append(entry, ActivityAction::Split)
    }

    /// Settle the most recent open `pattern` split entry of `name`
    ///
    /// Appends an equal-and-opposite entry from the player to the Pot; the
    /// original split entry is left untouched.
    ///
    /// # Errors
    ///
    /// - `InvalidSplit` if `pattern` is not in the catalog
    /// - `NoMatchingSplit` if `name` has no open split entry for `pattern`
    /// - `PersistenceFailure` if the store rejects the commit
    pub fn convert_split(
        &mut self,
        name: &str,
        pattern: &str,
    ) -> Result<Transaction, LedgerError> {
        if !self.catalog.is_valid(pattern) {
            debug!(name, pattern, "convert_split rejected: unknown split");
            return Err(LedgerError::invalid_split(pattern));
        }

        let amount = self
            .log
            .latest_open_split(name, pattern)
            .map(|open| open.amount)
            .ok_or_else(|| {
                debug!(name, pattern, "convert_split rejected: no open split");
                LedgerError::no_matching_split(name, pattern)
            })?;

        let entry = Transaction::new(POT, name, amount, pattern, Utc::now());
        self.commit_append(entry, ActivityAction::Convert)
    }

    /// Record `name` paying `amount` into the Pot
    ///
    /// # Errors
    ///
    /// - `InvalidPlayer` if `name` is the Pot or not on the roster
    /// - `InvalidAmount` if `amount` is not positive or would overflow a balance
    /// - `PersistenceFailure` if the store rejects the commit
    pub fn contribute(&mut self, name: &str, amount: Decimal) -> Result<Transaction, LedgerError> {
        self.require_player(name)?;
        if amount <= Decimal::ZERO {
            debug!(name, %amount, "contribute rejected: non-positive amount");
            return Err(LedgerError::invalid_amount(amount));
        }

        let entry = Transaction::new(POT, name, amount, "", Utc::now());
        self.commit_append(entry, ActivityAction::Contribution)
    }

    /// Remove the most recent entry
    ///
    /// # Returns
    ///
    /// The removed entry
    ///
    /// # Errors
    ///
    /// - `EmptyLedger` if there is nothing to remove
    /// - `PersistenceFailure` if the store rejects the removal (the entry is restored)
    pub fn remove_last_transaction(&mut self) -> Result<Transaction, LedgerError> {
        let head = self.log.pop().ok_or(LedgerError::EmptyLedger)?;

        if let Err(err) = self.store.remove_last(&head) {
            self.log.push(head);
            error!(
                sheet_id = self.store.sheet_id(),
                error = %err,
                "remove_last failed, entry restored"
            );
            return Err(err);
        }

        info!(
            sheet_id = self.store.sheet_id(),
            creditor = %head.creditor,
            debtor = %head.debtor,
            amount = %head.amount,
            split = %head.split,
            remaining = self.log.len(),
            "transaction removed"
        );
        self.record(Activity::new(ActivityAction::Undo, head.clone()));
        Ok(head)
    }

    /// The `count` most recent entries, most recent first
    pub fn list_recent(&self, count: i64) -> Vec<Transaction> {
        self.log.recent(count)
    }

    /// Balances derived from the full log
    pub fn current_balances(&self) -> Result<BTreeMap<String, Decimal>, LedgerError> {
        balance::compute_balances(
            self.registry.names().iter().map(String::as_str),
            self.log.entries(),
        )
        .ok_or_else(|| LedgerError::persistence("compute balances", BALANCE_OVERFLOW))
    }

    /// Rendered balances in roster order
    ///
    /// Names that only appear in the log (e.g. removed from the roster) follow
    /// the roster, alphabetically.
    pub fn balances(&self) -> Result<Vec<Balance>, LedgerError> {
        let derived = self.current_balances()?;

        let mut rows: Vec<Balance> = self
            .registry
            .names()
            .iter()
            .map(|name| Balance::new(name, derived.get(name).copied().unwrap_or_default()))
            .collect();
        rows.extend(
            derived
                .iter()
                .filter(|(name, _)| !self.registry.contains(name))
                .map(|(name, amount)| Balance::new(name, *amount)),
        );
        Ok(rows)
    }

    /// All account names, the Pot included
    pub fn names(&self) -> Vec<String> {
        self.registry.names().to_vec()
    }

    /// Snapshot of the split catalog
    pub fn valid_splits(&self) -> BTreeSet<String> {
        self.catalog.all()
    }

    /// Split entries not yet settled, oldest first
    pub fn open_splits(&self) -> Vec<Transaction> {
        let entries = self.log.entries();
        self.log
            .open_split_indices()
            .into_iter()
            .map(|index| entries[index].clone())
            .collect()
    }

    pub fn sheet_id(&self) -> &str {
        self.store.sheet_id()
    }

    pub fn log(&self) -> &TransactionLog {
        &self.log
    }

    fn require_player(&self, name: &str) -> Result<(), LedgerError> {
        if self.registry.is_player(name) {
            Ok(())
        } else {
            debug!(name, "rejected: not a player");
            Err(LedgerError::invalid_player(name))
        }
    }

    /// Commit `entry` to the store, then make it the new head
    fn commit_append(
        &mut self,
        mut entry: Transaction,
        action: ActivityAction,
    ) -> Result<Transaction, LedgerError> {
        entry.pot_amount = self.projected_pot(&entry).ok_or_else(|| {
            debug!(
                creditor = %entry.creditor,
                debtor = %entry.debtor,
                amount = %entry.amount,
                "rejected: balance would overflow"
            );
            LedgerError::invalid_amount(entry.amount)
        })?;

        if let Err(err) = self.store.append(&entry, self.log.entries()) {
            error!(
                sheet_id = self.store.sheet_id(),
                action = %action,
                error = %err,
                "append failed, mutation not applied"
            );
            return Err(err);
        }
        self.log.push(entry.clone());

        info!(
            sheet_id = self.store.sheet_id(),
            action = %action,
            creditor = %entry.creditor,
            debtor = %entry.debtor,
            amount = %entry.amount,
            split = %entry.split,
            pot = %entry.pot_amount,
            "transaction recorded"
        );
        self.record(Activity::new(action, entry.clone()));
        Ok(entry)
    }

    /// Pot balance once `entry` is applied, `None` if any balance would overflow
    fn projected_pot(&self, entry: &Transaction) -> Option<Decimal> {
        let balances = balance::compute_balances(
            self.registry.names().iter().map(String::as_str),
            self.log.entries(),
        )?;
        let current = |name: &str| balances.get(name).copied().unwrap_or_default();

        current(&entry.creditor).checked_add(entry.amount)?;
        current(&entry.debtor).checked_sub(entry.amount)?;
        current(POT).checked_add(entry.pot_delta())
    }

    /// Append an audit row; the ledger change it describes is already durable
    fn record(&mut self, activity: Activity) {
        if let Err(err) = self.store.record_activity(&activity) {
            warn!(
                sheet_id = self.store.sheet_id(),
                action = %activity.action,
                error = %err,
                "activity log write failed"
            );
        }
    }
}

impl std::fmt::Debug for LedgerEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerEngine")
            .field("sheet_id", &self.store.sheet_id())
            .field("accounts", &self.registry.names())
            .field("splits", &self.catalog.len())
            .field("transactions", &self.log.len())
            .finish()
    }
}
