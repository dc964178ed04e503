//! Transaction log
//!
//! This module provides the `TransactionLog`, the ordered sequence of ledger
//! entries that is the single source of truth for balances. It behaves like a
//! stack: entries are pushed on top and only the top entry can be popped.
//!
//! # Settlement Matching
//!
//! Whether a split entry is still open is derived, never stored. Replaying the
//! log, every settlement closes the most recent still-open split entry with the
//! same player and pattern. Because only the head can be removed, undoing a
//! settlement reopens exactly the entry it closed.

use crate::types::{EntryKind, Transaction};
use std::collections::HashMap;

/// Ordered log of ledger entries
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionLog {
    /// Entries in insertion order; the last element is the head
    entries: Vec<Transaction>,
}

impl TransactionLog {
    /// Create an empty log
    pub fn new() -> Self {
        TransactionLog {
            entries: Vec::new(),
        }
    }

    /// Push a new head entry
    pub fn push(&mut self, tx: Transaction) {
        self.entries.push(tx);
    }

    /// Pop the head entry
    ///
    /// # Returns
    ///
    /// * `Some(Transaction)` - The entry that was the head
    /// * `None` - If the log is empty
    pub fn pop(&mut self) -> Option<Transaction> {
        self.entries.pop()
    }

    /// The most recent entry
    pub fn head(&self) -> Option<&Transaction> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries, oldest first
    pub fn entries(&self) -> &[Transaction] {
        &self.entries
    }

    /// The `count` most recent entries, most recent first
    ///
    /// A non-positive `count` yields nothing; a `count` past the length yields the
    /// whole log.
    pub fn recent(&self, count: i64) -> Vec<Transaction> {
        if count <= 0 {
            return Vec::new();
        }
        let take = usize::try_from(count).unwrap_or(usize::MAX);
        self.entries.iter().rev().take(take).cloned().collect()
    }

    /// Indices of split entries that no settlement has closed, oldest first
    pub fn open_split_indices(&self) -> Vec<usize> {
        let mut open: HashMap<(&str, &str), Vec<usize>> = HashMap::new();

        for (index, tx) in self.entries.iter().enumerate() {
            match tx.kind() {
                EntryKind::Split => {
                    open.entry((tx.creditor.as_str(), tx.split.as_str()))
                        .or_default()
                        .push(index);
                }
                EntryKind::Settlement => {
                    if let Some(stack) = open.get_mut(&(tx.debtor.as_str(), tx.split.as_str())) {
                        stack.pop();
                    }
                }
                EntryKind::Contribution | EntryKind::Transfer => {}
            }
        }

        let mut indices: Vec<usize> = open.into_values().flatten().collect();
        indices.sort_unstable();
        indices
    }

    /// The most recent open split entry for `name` and `pattern`
    pub fn latest_open_split(&self, name: &str, pattern: &str) -> Option<&Transaction> {
        self.open_split_indices()
            .into_iter()
            .rev()
            .map(|index| &self.entries[index])
            .find(|tx| tx.creditor == name && tx.split == pattern)
    }
}

impl From<Vec<Transaction>> for TransactionLog {
    fn from(entries: Vec<Transaction>) -> Self {
        TransactionLog { entries }
    }
}
