//! Split catalog
//!
//! The set of split patterns a sheet recognizes, each with the payout a player
//! receives from the Pot for hitting it. Loaded once per sheet and read-only
//! afterwards.

use crate::types::{LedgerError, SplitPattern};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};

/// Award table seeded into a sheet that has none
///
/// Amounts are in the same unit as every other ledger amount.
pub const DEFAULT_SPLIT_AWARDS: &[(&str, i64)] = &[
    ("2-3", 750),
    ("3-6", 1000),
    ("4-5", 1250),
    ("4-5-6", 1500),
    ("4-6-7-10", 2000),
    ("4-7-10", 2000),
    ("5-6", 1750),
    ("6-7-10", 2250),
    ("7-9", 500),
    ("7-10", 2500),
];

/// Read-only catalog of recognized split patterns and their payouts
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SplitCatalog {
    awards: BTreeMap<String, Decimal>,
}

impl SplitCatalog {
    /// Build a catalog from `(pattern, payout)` pairs
    ///
    /// # Errors
    ///
    /// - `InvalidSplit` if a pattern is not in canonical form
    /// - `InvalidAmount` if a payout is negative
    pub fn new<I>(awards: I) -> Result<Self, LedgerError>
    where
        I: IntoIterator<Item = (String, Decimal)>,
    {
        let mut catalog = BTreeMap::new();
        for (pattern, payout) in awards {
            let pattern: SplitPattern = pattern.parse()?;
            if payout < Decimal::ZERO {
                return Err(LedgerError::invalid_amount(payout));
            }
            catalog.insert(pattern.to_string(), payout);
        }
        Ok(SplitCatalog { awards: catalog })
    }

    /// The catalog seeded into fresh sheets
    pub fn with_defaults() -> Self {
        SplitCatalog {
            awards: DEFAULT_SPLIT_AWARDS
                .iter()
                .map(|(pattern, cents)| (pattern.to_string(), Decimal::new(*cents, 2)))
                .collect(),
        }
    }

    /// Whether `pattern` is a recognized split
    ///
    /// Membership is exact: `9-7` is not the same pattern as `7-9`.
    pub fn is_valid(&self, pattern: &str) -> bool {
        self.awards.contains_key(pattern)
    }

    /// Payout configured for `pattern`, if it is recognized
    pub fn payout(&self, pattern: &str) -> Option<Decimal> {
        self.awards.get(pattern).copied()
    }

    /// Snapshot of every recognized pattern
    pub fn all(&self) -> BTreeSet<String> {
        self.awards.keys().cloned().collect()
    }

    /// `(pattern, payout)` pairs in pattern order
    pub fn awards(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.awards.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.awards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.awards.is_empty()
    }
}
