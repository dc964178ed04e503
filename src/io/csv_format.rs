//! CSV format handling for sheet files and command output
//!
//! This module centralizes all CSV format concerns, providing:
//! - Record structures for the roster, award table, and transaction files
//! - Conversion from CSV records to domain types
//! - Row serialization for transactions and activity
//! - Balance and transaction output for the CLI
//!
//! All functions are pure (no file I/O) for easy testing.

use crate::types::{Activity, Balance, Transaction};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Write;
use std::str::FromStr;

/// Header of `transactions.csv`
pub const TRANSACTION_HEADERS: [&str; 7] = [
    "creditor",
    "debtor",
    "amount",
    "split",
    "time",
    "pot_amount",
    "date",
];

/// Header of `activity_log.csv`
pub const ACTIVITY_HEADERS: [&str; 8] = [
    "action",
    "creditor",
    "debtor",
    "amount",
    "split",
    "time",
    "pot_amount",
    "date",
];

/// Header of `names.csv`
pub const NAME_HEADERS: [&str; 1] = ["name"];

/// Header of `split_awards.csv`
pub const AWARD_HEADERS: [&str; 2] = ["split", "award"];

/// A row of `transactions.csv`
///
/// Amounts are read as strings and parsed into `Decimal` explicitly so that no
/// float ever sits between the file and the ledger.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct TransactionCsvRecord {
    pub creditor: String,
    pub debtor: String,
    pub amount: String,
    #[serde(default)]
    pub split: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub pot_amount: String,
    #[serde(default)]
    pub date: String,
}

/// A row of `split_awards.csv`
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AwardCsvRecord {
    pub split: String,
    pub award: String,
}

/// A row of `names.csv`
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct NameCsvRecord {
    pub name: String,
}

fn parse_amount(field: &str, value: &str) -> Result<Decimal, String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(format!("Missing {}", field));
    }
    Decimal::from_str(value).map_err(|_| format!("Invalid {} '{}'", field, value))
}

/// Convert a transaction row into a ledger entry
///
/// # Returns
///
/// * `Ok(Transaction)` - Successfully converted entry
/// * `Err(String)` - Missing accounts, or a missing, malformed, or negative amount
pub fn convert_transaction_record(record: TransactionCsvRecord) -> Result<Transaction, String> {
    let creditor = record.creditor.trim();
    let debtor = record.debtor.trim();
    if creditor.is_empty() || debtor.is_empty() {
        return Err("Transaction requires a creditor and a debtor".to_string());
    }

    let amount = parse_amount("amount", &record.amount)?;
    if amount < Decimal::ZERO {
        return Err(format!("Invalid amount '{}'", record.amount.trim()));
    }

    // The cached pot amount is display-only; tolerate it being blank.
    let pot_amount = if record.pot_amount.trim().is_empty() {
        Decimal::ZERO
    } else {
        parse_amount("pot_amount", &record.pot_amount)?
    };

    Ok(Transaction {
        creditor: creditor.to_string(),
        debtor: debtor.to_string(),
        amount,
        split: record.split.trim().to_string(),
        time: record.time,
        pot_amount,
        date: record.date,
    })
}

/// Convert an award row into a `(pattern, payout)` pair
pub fn convert_award_record(record: AwardCsvRecord) -> Result<(String, Decimal), String> {
    let split = record.split.trim();
    if split.is_empty() {
        return Err("Award requires a split".to_string());
    }
    let award = parse_amount("award", &record.award)?;
    Ok((split.to_string(), award))
}

/// Serialize an entry as a `transactions.csv` row
pub fn transaction_row(tx: &Transaction) -> [String; 7] {
    [
        tx.creditor.clone(),
        tx.debtor.clone(),
        tx.amount.to_string(),
        tx.split.clone(),
        tx.time.clone(),
        tx.pot_amount.to_string(),
        tx.date.clone(),
    ]
}

/// Serialize an audit row as an `activity_log.csv` row
pub fn activity_row(activity: &Activity) -> [String; 8] {
    let [creditor, debtor, amount, split, time, pot_amount, date] = transaction_row(&activity.entry);
    [
        activity.action.to_string(),
        creditor,
        debtor,
        amount,
        split,
        time,
        pot_amount,
        date,
    ]
}

/// Write balances in CSV format with columns: name, amount
///
/// Rows keep the order they are given in (roster order).
pub fn write_balances_csv(balances: &[Balance], output: &mut dyn Write) -> Result<(), String> {
    use csv::Writer;

    let mut writer = Writer::from_writer(output);

    writer
        .write_record(["name", "amount"])
        .map_err(|e| format!("Failed to write CSV header: {}", e))?;

    for balance in balances {
        writer
            .write_record([balance.name.as_str(), balance.amount.as_str()])
            .map_err(|e| format!("Failed to write balance record: {}", e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))?;

    Ok(())
}

/// Write transactions in CSV format with the `transactions.csv` columns
pub fn write_transactions_csv(
    transactions: &[Transaction],
    output: &mut dyn Write,
) -> Result<(), String> {
    use csv::Writer;

    let mut writer = Writer::from_writer(output);

    writer
        .write_record(TRANSACTION_HEADERS)
        .map_err(|e| format!("Failed to write CSV header: {}", e))?;

    for tx in transactions {
        writer
            .write_record(transaction_row(tx))
            .map_err(|e| format!("Failed to write transaction record: {}", e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))?;

    Ok(())
}
