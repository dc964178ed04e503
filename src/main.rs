//! Split Ledger CLI
//!
//! Command-line interface for the split pot ledger. Each invocation runs exactly
//! one command against the selected sheet and prints its result to stdout.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- balances
//! cargo run -- create-split Alice 7-9
//! cargo run -- convert-split Alice 7-9
//! cargo run -- --format csv transactions 20 > recent.csv
//! cargo run -- set-sheet-id league-2025
//! ```
//!
//! Sheets live under `--data-dir` (or `SPLIT_LEDGER_DATA_DIR`), one directory
//! per sheet id. Logs go to stderr and honour `RUST_LOG`.
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (rejected command, unreadable sheet, output failure, etc.)

use split_ledger::cli::{self, OutputFormat};
use split_ledger::io::csv_format::{write_balances_csv, write_transactions_csv};
use split_ledger::io::{CsvSheetStoreFactory, SettingsFile};
use split_ledger::{logging, CommandOutput, LedgerConfig, LedgerService};
use std::io::Write;
use std::process;

fn main() {
    let args = cli::parse_args();
    let config = LedgerConfig::from_args(&args);
    logging::init(&config.log_filter);

    let command = args.command.into_command();

    let runtime = match tokio::runtime::Builder::new_current_thread().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: Failed to create tokio runtime: {}", e);
            process::exit(1);
        }
    };

    let result = runtime.block_on(async {
        let stores = CsvSheetStoreFactory::new(&config.data_dir);
        let settings = SettingsFile::new(&config.settings_path);
        match LedgerService::open(Box::new(stores), settings) {
            Ok(service) => service.execute(command).await,
            Err(e) => Err(e),
        }
    });

    let output = match result {
        Ok(output) => output,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let mut stdout = std::io::stdout();
    if let Err(e) = write_output(&output, config.format, &mut stdout) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Print a command result in the requested format
fn write_output(
    output: &CommandOutput,
    format: OutputFormat,
    out: &mut dyn Write,
) -> Result<(), String> {
    if *output == CommandOutput::Done {
        return Ok(());
    }

    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, output)
                .map_err(|e| format!("Failed to write JSON output: {}", e))?;
            writeln!(out).map_err(|e| format!("Failed to write output: {}", e))
        }
        OutputFormat::Csv => match output {
            CommandOutput::Balances(rows) => write_balances_csv(rows, out),
            CommandOutput::Transactions(rows) => write_transactions_csv(rows, out),
            CommandOutput::Names(names) => write_column("name", names.iter(), out),
            CommandOutput::ValidSplits(splits) => write_column("split", splits.iter(), out),
            CommandOutput::SheetId(sheet_id) => {
                writeln!(out, "{}", sheet_id).map_err(|e| format!("Failed to write output: {}", e))
            }
            CommandOutput::Done => Ok(()),
        },
    }
}

fn write_column<'a, I>(header: &str, values: I, out: &mut dyn Write) -> Result<(), String>
where
    I: Iterator<Item = &'a String>,
{
    let mut writer = csv::Writer::from_writer(out);
    writer
        .write_record([header])
        .map_err(|e| format!("Failed to write CSV header: {}", e))?;
    for value in values {
        writer
            .write_record([value])
            .map_err(|e| format!("Failed to write CSV record: {}", e))?;
    }
    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))
}
