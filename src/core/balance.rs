//! Balance calculator
//!
//! Pure functions deriving balances from a log. Nothing here reads the cached
//! `pot_amount` on an entry except [`stale_pot_snapshots`], which exists to
//! compare the cache against the recomputed projection.
//!
//! All arithmetic is checked: a log whose running balances leave the `Decimal`
//! range replays to `None`.

use crate::types::Transaction;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Derive every account's balance from `log`
///
/// Each name in `accounts` starts at zero. Entries are applied in order: the
/// creditor gains `amount`, the debtor loses it. Names that only appear in the
/// log still get a balance, so the result always sums to zero.
///
/// Returns `None` if any running balance overflows.
pub fn compute_balances<'a, I>(accounts: I, log: &[Transaction]) -> Option<BTreeMap<String, Decimal>>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut balances: BTreeMap<String, Decimal> = accounts
        .into_iter()
        .map(|name| (name.to_string(), Decimal::ZERO))
        .collect();

    for tx in log {
        let creditor = balances.entry(tx.creditor.clone()).or_insert(Decimal::ZERO);
        *creditor = creditor.checked_add(tx.amount)?;
        let debtor = balances.entry(tx.debtor.clone()).or_insert(Decimal::ZERO);
        *debtor = debtor.checked_sub(tx.amount)?;
    }

    Some(balances)
}

/// Pot balance of `log` after every entry has been applied
pub fn pot_balance(log: &[Transaction]) -> Option<Decimal> {
    log.iter()
        .try_fold(Decimal::ZERO, |pot, tx| pot.checked_add(tx.pot_delta()))
}

/// Running Pot balance after each entry, in log order
pub fn pot_snapshots(log: &[Transaction]) -> Option<Vec<Decimal>> {
    let mut pot = Decimal::ZERO;
    log.iter()
        .map(|tx| {
            pot = pot.checked_add(tx.pot_delta())?;
            Some(pot)
        })
        .collect()
}

/// Indices of entries whose cached `pot_amount` disagrees with the log
pub fn stale_pot_snapshots(log: &[Transaction]) -> Option<Vec<usize>> {
    let stale = log
        .iter()
        .zip(pot_snapshots(log)?)
        .enumerate()
        .filter(|(_, (tx, expected))| tx.pot_amount != *expected)
        .map(|(index, _)| index)
        .collect();
    Some(stale)
}

/// Sum of every balance; zero for any replayable log
pub fn total(balances: &BTreeMap<String, Decimal>) -> Option<Decimal> {
    balances
        .values()
        .try_fold(Decimal::ZERO, |sum, amount| sum.checked_add(*amount))
}
