//! I/O module
//!
//! Handles sheet persistence, settings, and CSV output.
//!
//! # Components
//!
//! - `csv_format` - CSV format handling (record conversion, output serialization)
//! - `sheet_store` - Sheets stored as directories of CSV files
//! - `memory_store` - Sheets held in memory, with failure injection for tests
//! - `settings` - The JSON settings file naming the selected sheet

pub mod csv_format;
pub mod memory_store;
pub mod settings;
pub mod sheet_store;

pub use csv_format::{write_balances_csv, write_transactions_csv};
pub use memory_store::{MemoryStore, MemoryStoreFactory};
pub use settings::{validate_sheet_id, SettingsFile, DEMO_SHEET_ID};
pub use sheet_store::{CsvSheetStore, CsvSheetStoreFactory};
