//! Settings file holding the selected sheet id
//!
//! The file is JSON of the form `{"sheet-id": {"value": "<id>"}}`. Writes go to a
//! temp file that is then renamed over the original so a crash never leaves a
//! half-written settings file behind.

use crate::types::LedgerError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Sheet selected when settings name none
pub const DEMO_SHEET_ID: &str = "demo";

#[derive(Debug, Default, Serialize, Deserialize)]
struct SettingsDocument {
    #[serde(rename = "sheet-id", default, skip_serializing_if = "Option::is_none")]
    sheet_id: Option<SheetIdValue>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SheetIdValue {
    value: String,
}

/// Check that `sheet_id` can name a backing store
///
/// Ids are non-empty and made of ASCII letters, digits, `-` and `_`, so they are
/// always safe to use as a directory name.
pub fn validate_sheet_id(sheet_id: &str) -> Result<(), LedgerError> {
    let valid = !sheet_id.is_empty()
        && sheet_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(LedgerError::invalid_sheet_id(sheet_id))
    }
}

/// JSON settings file on disk
#[derive(Debug, Clone)]
pub struct SettingsFile {
    path: PathBuf,
}

impl SettingsFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        SettingsFile {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The stored sheet id, if any
    pub fn sheet_id(&self) -> Result<Option<String>, LedgerError> {
        Ok(self.read()?.sheet_id.map(|v| v.value))
    }

    /// The stored sheet id, storing the demo id first if none is set
    pub fn sheet_id_or_demo(&self) -> Result<String, LedgerError> {
        if let Some(sheet_id) = self.sheet_id()? {
            info!(sheet_id = %sheet_id, "sheet id already set");
            return Ok(sheet_id);
        }
        info!(sheet_id = DEMO_SHEET_ID, "no sheet id stored, using demo sheet");
        self.set_sheet_id(DEMO_SHEET_ID)?;
        Ok(DEMO_SHEET_ID.to_string())
    }

    /// Durably store `sheet_id` as the selected sheet
    pub fn set_sheet_id(&self, sheet_id: &str) -> Result<(), LedgerError> {
        validate_sheet_id(sheet_id)?;

        let mut document = self.read()?;
        document.sheet_id = Some(SheetIdValue {
            value: sheet_id.to_string(),
        });

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let data = serde_json::to_vec_pretty(&document)?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, data)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    fn read(&self) -> Result<SettingsDocument, LedgerError> {
        if !self.path.exists() {
            return Ok(SettingsDocument::default());
        }
        let data = fs::read(&self.path)?;
        if data.iter().all(u8::is_ascii_whitespace) {
            return Ok(SettingsDocument::default());
        }
        Ok(serde_json::from_slice(&data)?)
    }
}
