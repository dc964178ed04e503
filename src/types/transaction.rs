//! Transaction-related types for the split ledger
//!
//! A [`Transaction`] moves `amount` from its debtor to its creditor. What the
//! entry *means* is read off its direction and split field, see [`EntryKind`].

use super::account::is_pot;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Display format of the `time` column
pub const TIME_FORMAT: &str = "%-m/%-d/%Y, %l:%M:%S %p UTC";

/// Display format of the `date` column
pub const DATE_FORMAT: &str = "%-m/%-d/%Y";

/// A single ledger entry
///
/// Amounts serialize as JSON numbers for callers; internally they stay exact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Account whose balance increases
    pub creditor: String,

    /// Account whose balance decreases
    pub debtor: String,

    /// Non-negative magnitude of the transfer
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,

    /// Split pattern this entry records, empty for plain transfers
    pub split: String,

    /// Creation time, display only
    pub time: String,

    /// Pot balance right after this entry was applied
    ///
    /// Cached for display. The authoritative value is always recomputed from the
    /// log, see [`crate::core::balance::pot_snapshots`].
    #[serde(with = "rust_decimal::serde::float")]
    pub pot_amount: Decimal,

    /// Creation date, display only
    pub date: String,
}

/// Classification of a ledger entry by direction and split field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// The Pot owes a player for a recognized split
    Split,
    /// The Pot's debt for an earlier split was discharged
    Settlement,
    /// A player paid into the Pot
    Contribution,
    /// Anything else (player to player, Pot to Pot)
    Transfer,
}

impl Transaction {
    /// Build an entry stamped with `now`; `pot_amount` is filled in by the engine
    pub fn new(
        creditor: &str,
        debtor: &str,
        amount: Decimal,
        split: &str,
        now: DateTime<Utc>,
    ) -> Self {
        Transaction {
            creditor: creditor.to_string(),
            debtor: debtor.to_string(),
            amount,
            split: split.to_string(),
            time: now.format(TIME_FORMAT).to_string(),
            pot_amount: Decimal::ZERO,
            date: now.format(DATE_FORMAT).to_string(),
        }
    }

    pub fn kind(&self) -> EntryKind {
        match (is_pot(&self.creditor), is_pot(&self.debtor)) {
            (false, true) => EntryKind::Split,
            (true, false) if !self.split.is_empty() => EntryKind::Settlement,
            (true, false) => EntryKind::Contribution,
            _ => EntryKind::Transfer,
        }
    }

    /// Change this entry applies to the Pot's balance
    pub fn pot_delta(&self) -> Decimal {
        let mut delta = Decimal::ZERO;
        if is_pot(&self.creditor) {
            delta += self.amount;
        }
        if is_pot(&self.debtor) {
            delta -= self.amount;
        }
        delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn entry(creditor: &str, debtor: &str, split: &str) -> Transaction {
        let now = Utc.with_ymd_and_hms(2025, 1, 15, 14, 30, 0).unwrap();
        Transaction::new(creditor, debtor, Decimal::new(500, 2), split, now)
    }

    #[rstest]
    #[case::split(entry("Alice", "Pot", "7-9"), EntryKind::Split)]
    #[case::settlement(entry("Pot", "Alice", "7-9"), EntryKind::Settlement)]
    #[case::contribution(entry("Pot", "Alice", ""), EntryKind::Contribution)]
    #[case::player_to_player(entry("Alice", "Bob", ""), EntryKind::Transfer)]
    fn test_kind(#[case] tx: Transaction, #[case] expected: EntryKind) {
        assert_eq!(tx.kind(), expected);
    }

    #[test]
    fn test_split_entry_ignores_empty_split_field() {
        // Direction alone decides: a payout with no pattern still counts.
        assert_eq!(entry("Alice", "Pot", "").kind(), EntryKind::Split);
    }

    #[rstest]
    #[case::payout(entry("Alice", "Pot", "7-9"), Decimal::new(-500, 2))]
    #[case::settlement(entry("Pot", "Alice", "7-9"), Decimal::new(500, 2))]
    #[case::unrelated(entry("Alice", "Bob", ""), Decimal::ZERO)]
    fn test_pot_delta(#[case] tx: Transaction, #[case] expected: Decimal) {
        assert_eq!(tx.pot_delta(), expected);
    }

    #[test]
    fn test_timestamps_use_display_format() {
        let tx = entry("Alice", "Pot", "7-9");
        assert_eq!(tx.time, "1/15/2025,  2:30:00 PM UTC");
        assert_eq!(tx.date, "1/15/2025");
    }

    #[test]
    fn test_amounts_serialize_as_numbers() {
        let json = serde_json::to_value(entry("Alice", "Pot", "7-9")).unwrap();
        assert_eq!(json["amount"], serde_json::json!(5.0));
        assert_eq!(json["pot_amount"], serde_json::json!(0.0));
    }
}
