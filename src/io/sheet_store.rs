//! CSV-backed ledger store
//!
//! Each sheet lives in its own directory under the data directory:
//!
//! ```text
//! <data_dir>/<sheet_id>/
//!     names.csv          name
//!     split_awards.csv   split,award
//!     transactions.csv   creditor,debtor,amount,split,time,pot_amount,date
//!     activity_log.csv   action,creditor,...,date
//! ```
//!
//! Missing roster and award files are seeded with the defaults when a sheet is
//! opened. Appends are fsynced before returning and cut back off the file if
//! they fail. Removing the head rewrites the transaction file through a temp
//! file and a rename, after checking that the durable head is the entry the
//! caller means to remove.
//!
//! Writers from separate processes are serialized by an exclusive lock on
//! `.lock` in the sheet directory, held while the stored log is checked
//! against the caller's view and changed.

use crate::core::account_registry::DEFAULT_NAMES;
use crate::core::split_catalog::SplitCatalog;
use crate::core::traits::{ensure_unchanged, LedgerStore, SheetContents, StoreFactory};
use crate::io::csv_format::{
    activity_row, convert_award_record, convert_transaction_record, transaction_row,
    NameCsvRecord, ACTIVITY_HEADERS, AWARD_HEADERS, NAME_HEADERS, TRANSACTION_HEADERS,
};
use crate::io::settings::validate_sheet_id;
use crate::types::{Activity, LedgerError, Transaction};
use csv::{ReaderBuilder, Trim, WriterBuilder};
use serde::de::DeserializeOwned;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const NAMES_FILE: &str = "names.csv";
const AWARDS_FILE: &str = "split_awards.csv";
const TRANSACTIONS_FILE: &str = "transactions.csv";
const ACTIVITY_FILE: &str = "activity_log.csv";
const LOCK_FILE: &str = ".lock";

/// A sheet stored as a directory of CSV files
#[derive(Debug)]
pub struct CsvSheetStore {
    sheet_id: String,
    dir: PathBuf,
}

impl CsvSheetStore {
    /// Open the sheet `sheet_id` under `data_dir`, creating and seeding it if needed
    ///
    /// # Errors
    ///
    /// - `InvalidSheetId` if `sheet_id` cannot name a directory
    /// - `PersistenceFailure` if the directory or seed files cannot be written
    pub fn open(data_dir: &Path, sheet_id: &str) -> Result<Self, LedgerError> {
        validate_sheet_id(sheet_id)?;

        let dir = data_dir.join(sheet_id);
        fs::create_dir_all(&dir)?;
        let store = CsvSheetStore {
            sheet_id: sheet_id.to_string(),
            dir,
        };
        store.seed()?;
        Ok(store)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    fn seed(&self) -> Result<(), LedgerError> {
        let names = self.path(NAMES_FILE);
        if !names.exists() {
            let rows = DEFAULT_NAMES.iter().map(|name| vec![name.to_string()]);
            write_file(&names, &NAME_HEADERS, rows)?;
            info!(sheet_id = %self.sheet_id, "seeded default roster");
        }

        let awards = self.path(AWARDS_FILE);
        if !awards.exists() {
            let catalog = SplitCatalog::with_defaults();
            let rows = catalog
                .awards()
                .map(|(pattern, payout)| vec![pattern.to_string(), payout.to_string()]);
            write_file(&awards, &AWARD_HEADERS, rows)?;
            info!(sheet_id = %self.sheet_id, "seeded default split awards");
        }

        let transactions = self.path(TRANSACTIONS_FILE);
        if !transactions.exists() {
            write_file(&transactions, &TRANSACTION_HEADERS, std::iter::empty())?;
            debug!(sheet_id = %self.sheet_id, "created empty transaction file");
        }
        Ok(())
    }

    /// Take the sheet's writer lock; it is released when the file is dropped
    fn lock(&self) -> Result<File, LedgerError> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(self.path(LOCK_FILE))?;
        file.lock()?;
        Ok(file)
    }

    fn read_transactions(&self) -> Result<Vec<Transaction>, LedgerError> {
        read_records(
            &self.path(TRANSACTIONS_FILE),
            "load transactions",
            convert_transaction_record,
        )
    }
}

impl LedgerStore for CsvSheetStore {
    fn sheet_id(&self) -> &str {
        &self.sheet_id
    }

    fn load(&self) -> Result<SheetContents, LedgerError> {
        let names = read_records(&self.path(NAMES_FILE), "load names", |r: NameCsvRecord| {
            Ok(r.name)
        })?;
        let awards = read_records(
            &self.path(AWARDS_FILE),
            "load split awards",
            convert_award_record,
        )?;
        let transactions = self.read_transactions()?;

        debug!(
            sheet_id = %self.sheet_id,
            names = names.len(),
            awards = awards.len(),
            transactions = transactions.len(),
            "sheet files read"
        );

        Ok(SheetContents {
            names,
            awards,
            transactions,
        })
    }

    fn append(&mut self, tx: &Transaction, expected: &[Transaction]) -> Result<(), LedgerError> {
        let _lock = self.lock()?;
        ensure_unchanged("append", &self.read_transactions()?, expected)?;
        append_row(
            &self.path(TRANSACTIONS_FILE),
            &TRANSACTION_HEADERS,
            &transaction_row(tx),
        )
    }

    fn remove_last(&mut self, head: &Transaction) -> Result<(), LedgerError> {
        let _lock = self.lock()?;
        let mut transactions = self.read_transactions()?;
        match transactions.last() {
            Some(last) if last == head => {}
            Some(_) => {
                return Err(LedgerError::persistence(
                    "remove_last",
                    "stored head does not match the ledger head",
                ))
            }
            None => return Err(LedgerError::persistence("remove_last", "stored log is empty")),
        }
        transactions.pop();

        let path = self.path(TRANSACTIONS_FILE);
        let tmp_path = path.with_extension("csv.tmp");
        write_file(
            &tmp_path,
            &TRANSACTION_HEADERS,
            transactions.iter().map(|tx| transaction_row(tx).to_vec()),
        )?;
        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    fn record_activity(&mut self, activity: &Activity) -> Result<(), LedgerError> {
        append_row(
            &self.path(ACTIVITY_FILE),
            &ACTIVITY_HEADERS,
            &activity_row(activity),
        )
    }
}

/// Opens CSV sheets as subdirectories of a data directory
#[derive(Debug, Clone)]
pub struct CsvSheetStoreFactory {
    data_dir: PathBuf,
}

impl CsvSheetStoreFactory {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        CsvSheetStoreFactory {
            data_dir: data_dir.as_ref().to_path_buf(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

impl StoreFactory for CsvSheetStoreFactory {
    fn open(&self, sheet_id: &str) -> Result<Box<dyn LedgerStore>, LedgerError> {
        Ok(Box::new(CsvSheetStore::open(&self.data_dir, sheet_id)?))
    }
}

/// Deserialize every row of `path`, failing on the first bad row
fn read_records<R, T, F>(path: &Path, operation: &str, convert: F) -> Result<Vec<T>, LedgerError>
where
    R: DeserializeOwned,
    F: Fn(R) -> Result<T, String>,
{
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_path(path)?;

    let mut rows = Vec::new();
    for (index, result) in reader.deserialize::<R>().enumerate() {
        // Line 1 is the header
        let line = index + 2;
        let record = result?;
        let value = convert(record).map_err(|e| {
            LedgerError::persistence(operation, format!("{} line {}: {}", path.display(), line, e))
        })?;
        rows.push(value);
    }
    Ok(rows)
}

/// Write `headers` and `rows` to a fresh file and fsync it
fn write_file<I>(path: &Path, headers: &[&str], rows: I) -> Result<(), LedgerError>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let file = File::create(path)?;
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(&row)?;
    }
    let file = writer
        .into_inner()
        .map_err(|e| LedgerError::from(e.into_error()))?;
    file.sync_all()?;
    Ok(())
}

/// Append one row, writing `headers` first if the file is new or empty
fn append_row(path: &Path, headers: &[&str], row: &[String]) -> Result<(), LedgerError> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let original_len = file.metadata()?.len();

    let mut writer = WriterBuilder::new().has_headers(false).from_writer(Vec::new());
    if original_len == 0 {
        writer.write_record(headers)?;
    }
    writer.write_record(row)?;
    let bytes = writer
        .into_inner()
        .map_err(|e| LedgerError::from(e.into_error()))?;

    write_synced(&mut file, &bytes, original_len).map_err(|e| {
        warn!(path = %path.display(), error = %e, "append failed");
        LedgerError::from(e)
    })
}

/// A file that can be flushed to disk and cut back to a given length
trait SyncedFile: Write {
    fn sync_all(&self) -> io::Result<()>;
    fn set_len(&self, len: u64) -> io::Result<()>;
}

impl SyncedFile for File {
    fn sync_all(&self) -> io::Result<()> {
        File::sync_all(self)
    }

    fn set_len(&self, len: u64) -> io::Result<()> {
        File::set_len(self, len)
    }
}

/// Write `bytes` at the end of `file` and sync it
///
/// On failure the file is truncated back to `original_len`, so a row that was
/// only partly written, or written but not synced, does not outlive the error.
fn write_synced<F: SyncedFile>(file: &mut F, bytes: &[u8], original_len: u64) -> io::Result<()> {
    let result = file.write_all(bytes).and_then(|()| file.sync_all());
    if result.is_err() {
        if let Err(e) = file.set_len(original_len).and_then(|()| file.sync_all()) {
            warn!(error = %e, original_len, "cut back of failed append not synced");
        }
    }
    result
}
