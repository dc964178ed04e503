//! Split Ledger Library
//! # Overview
//!
//! This library keeps the ledger behind a bowling league's split pot: players are
//! paid out of a shared Pot when they pick up a recognized split, and later settle
//! those payouts. Balances are never stored; they are replayed from an ordered,
//! append-only transaction log whose head can be undone one entry at a time.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (Transaction, Balance, SplitPattern, errors)
//! - [`cli`] - CLI arguments parsing
//! - [`config`] - Resolved runtime configuration
//! - [`core`] - Business logic components:
//!   - [`core::engine`] - Ledger mutation orchestration with rollback
//!   - [`core::split_catalog`] - Recognized split patterns and payouts
//!   - [`core::balance`] - Balance derivation from the log
//!   - [`core::transaction_log`] - The log and settlement matching
//! - [`io`] - Sheet persistence (CSV directories, in-memory) and settings
//! - [`service`] - Async command service serializing writers
//!
//! # Entry Kinds
//!
//! Every entry moves `amount` from its debtor to its creditor:
//!
//! - **Split**: the Pot owes a player the award for a split
//! - **Settlement**: an earlier split payout is discharged by the opposite entry
//! - **Contribution**: a player pays into the Pot
//!
//! # Invariants
//!
//! - Balances across all accounts, the Pot included, always sum to zero
//! - A split entry is settled at most once
//! - A mutation is reported as successful only after it is durable

// Module declarations
pub mod cli;
pub mod config;
pub mod core;
pub mod io;
pub mod logging;
pub mod service;
pub mod types;

pub use config::LedgerConfig;
pub use core::{AccountRegistry, LedgerEngine, LedgerStore, SplitCatalog, StoreFactory};
pub use io::{write_balances_csv, write_transactions_csv, CsvSheetStoreFactory, SettingsFile};
pub use service::{Command, CommandOutput, LedgerService};
pub use types::{Balance, LedgerError, SplitPattern, Transaction, POT};
