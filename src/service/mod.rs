//! Ledger command service
//!
//! `LedgerService` owns the selected sheet behind a `tokio::sync::RwLock`.
//! Mutating commands hold the write lock across the whole validate, mutate and
//! persist sequence, so two undos can never both see the same head. Read commands
//! share the read lock and always observe a committed log.
//!
//! The sheet is loaded on the first command that needs it, and dropped again
//! when its store refuses a write, so the next command sees what is on disk.
//! The sheet id commands never load the current sheet: a sheet that fails to
//! load can always be switched away from.
//!
//! Switching sheets builds a complete engine for the new sheet before touching
//! anything; the previous sheet stays in service if any step fails.

mod command;

pub use command::{Command, CommandOutput};

use crate::core::{LedgerEngine, StoreFactory};
use crate::io::settings::{validate_sheet_id, SettingsFile, DEMO_SHEET_ID};
use crate::types::LedgerError;
use std::time::Instant;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// The selected sheet and its engine, once loaded
struct Selection {
    sheet_id: String,
    engine: Option<LedgerEngine>,
}

/// Serializes ledger commands against the selected sheet
pub struct LedgerService {
    selection: RwLock<Selection>,
    stores: Box<dyn StoreFactory>,
    settings: SettingsFile,
}

impl LedgerService {
    /// Select the sheet named in `settings`, or the demo sheet if none is set
    ///
    /// The sheet itself is loaded by the first command that needs it.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings file is unreadable.
    pub fn open(stores: Box<dyn StoreFactory>, settings: SettingsFile) -> Result<Self, LedgerError> {
        let sheet_id = settings.sheet_id_or_demo()?;

        Ok(LedgerService {
            selection: RwLock::new(Selection {
                sheet_id,
                engine: None,
            }),
            stores,
            settings,
        })
    }

    /// Run one command to completion
    pub async fn execute(&self, command: Command) -> Result<CommandOutput, LedgerError> {
        let label = command.name();
        let mutation = command.is_mutation();
        let started = Instant::now();

        let result = match command {
            Command::Balances => self.read(|e| Ok(CommandOutput::Balances(e.balances()?))).await,
            Command::Names => self.read(|e| Ok(CommandOutput::Names(e.names()))).await,
            Command::Transactions { count } => {
                self.read(|e| Ok(CommandOutput::Transactions(e.list_recent(count))))
                    .await
            }
            Command::GetValidSplits => {
                self.read(|e| Ok(CommandOutput::ValidSplits(e.valid_splits())))
                    .await
            }
            Command::OpenSplits => {
                self.read(|e| Ok(CommandOutput::Transactions(e.open_splits())))
                    .await
            }
            Command::GetSheetId => {
                let selection = self.selection.read().await;
                Ok(CommandOutput::SheetId(selection.sheet_id.clone()))
            }
            Command::CreateSplit { name, split_string } => {
                self.write(|e| e.create_split(&name, &split_string)).await
            }
            Command::ConvertSplit { name, split_string } => {
                self.write(|e| e.convert_split(&name, &split_string)).await
            }
            Command::Contribute { name, amount } => {
                self.write(|e| e.contribute(&name, amount)).await
            }
            Command::RemoveLastTransaction => self.write(|e| e.remove_last_transaction()).await,
            Command::SetSheetId { sheet_id } => self.switch(&sheet_id).await,
            Command::SetDemoSheetId => self.switch(DEMO_SHEET_ID).await,
        };

        let elapsed_us = started.elapsed().as_micros() as u64;
        match &result {
            Ok(_) => info!(command = label, mutation, elapsed_us, "command completed"),
            Err(err) => warn!(command = label, mutation, elapsed_us, error = %err, "command failed"),
        }
        result
    }

    /// Run `f` under the shared lock, loading the sheet first if needed
    async fn read<F>(&self, f: F) -> Result<CommandOutput, LedgerError>
    where
        F: FnOnce(&LedgerEngine) -> Result<CommandOutput, LedgerError>,
    {
        {
            let selection = self.selection.read().await;
            if let Some(engine) = &selection.engine {
                return f(engine);
            }
        }

        let mut selection = self.selection.write().await;
        f(self.loaded(&mut selection)?)
    }

    /// Run `f` under the exclusive lock
    ///
    /// A store failure may mean another writer moved the sheet on, so the
    /// engine is dropped and reloaded by the next command.
    async fn write<F, T>(&self, f: F) -> Result<CommandOutput, LedgerError>
    where
        F: FnOnce(&mut LedgerEngine) -> Result<T, LedgerError>,
    {
        let mut selection = self.selection.write().await;
        match f(self.loaded(&mut selection)?) {
            Ok(_) => Ok(CommandOutput::Done),
            Err(err) => {
                if err.is_persistence() {
                    selection.engine = None;
                    info!(sheet_id = %selection.sheet_id, "sheet will be reloaded");
                }
                Err(err)
            }
        }
    }

    /// The engine for the selected sheet, loading it on first use
    fn loaded<'a>(&self, selection: &'a mut Selection) -> Result<&'a mut LedgerEngine, LedgerError> {
        let engine = match selection.engine.take() {
            Some(engine) => engine,
            None => LedgerEngine::open(self.stores.open(&selection.sheet_id)?)?,
        };
        Ok(selection.engine.insert(engine))
    }

    /// Load `sheet_id` into a fresh engine and make it the selected sheet
    async fn switch(&self, sheet_id: &str) -> Result<CommandOutput, LedgerError> {
        let mut selection = self.selection.write().await;

        validate_sheet_id(sheet_id)?;
        let engine = LedgerEngine::open(self.stores.open(sheet_id)?)?;
        self.settings.set_sheet_id(sheet_id)?;

        *selection = Selection {
            sheet_id: sheet_id.to_string(),
            engine: Some(engine),
        };
        info!(sheet_id, "switched sheet");
        Ok(CommandOutput::Done)
    }
}

impl std::fmt::Debug for LedgerService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerService")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
