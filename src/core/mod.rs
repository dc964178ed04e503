//! Core business logic module
//!
//! This module contains the split ledger components:
//! - `traits` - Persistence abstractions the engine commits through
//! - `engine` - Ledger mutation orchestration
//! - `account_registry` - The roster and the Pot
//! - `split_catalog` - Recognized split patterns and payouts
//! - `transaction_log` - The ordered log and settlement matching
//! - `balance` - Pure balance derivation

pub mod account_registry;
pub mod balance;
pub mod engine;
pub mod split_catalog;
pub mod traits;
pub mod transaction_log;

pub use account_registry::AccountRegistry;
pub use engine::LedgerEngine;
pub use split_catalog::SplitCatalog;
pub use traits::{ensure_unchanged, LedgerStore, SheetContents, StoreFactory};
pub use transaction_log::TransactionLog;
