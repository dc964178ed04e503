//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `account`: the Pot and rendered balances
//! - `activity`: audit rows for accepted mutations
//! - `transaction`: ledger entries and their classification
//! - `split`: canonical split patterns
//! - `error`: error types for the ledger

pub mod account;
pub mod activity;
pub mod error;
pub mod split;
pub mod transaction;

pub use account::{is_pot, Balance, POT};
pub use activity::{Activity, ActivityAction};
pub use error::LedgerError;
pub use split::SplitPattern;
pub use transaction::{EntryKind, Transaction};
