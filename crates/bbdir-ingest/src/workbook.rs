//! Directory workbook persisted as JSON: sheet name to row objects.
//!
//! Workbooks are always read and written whole. Writes go to a sibling
//! temporary file that is renamed over the target.

use std::path::{Path, PathBuf};

use bbdir_model::{DirectoryStore, Sheets};
use tracing::info;

use crate::error::{IngestError, Result};

pub fn read_sheets(path: &Path) -> Result<Sheets> {
    let text = std::fs::read_to_string(path).map_err(|source| IngestError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| IngestError::Json {
        path: path.to_path_buf(),
        source,
    })
}

pub fn read_workbook(path: &Path) -> Result<DirectoryStore> {
    let sheets = read_sheets(path)?;
    let store = DirectoryStore::from_sheets(sheets).map_err(|source| IngestError::Workbook {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), "loaded directory workbook");
    Ok(store)
}

pub fn write_sheets(path: &Path, sheets: &Sheets) -> Result<()> {
    let text = serde_json::to_string_pretty(sheets).map_err(|source| IngestError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    write_atomically(path, text.as_bytes())?;
    info!(path = %path.display(), sheets = sheets.len(), "wrote workbook");
    Ok(())
}

/// Every sheet of the store.
pub fn write_workbook(path: &Path, store: &DirectoryStore) -> Result<()> {
    write_sheets(path, &store.to_sheets())
}

/// Only the rows created or updated during the run.
pub fn write_delta(path: &Path, store: &DirectoryStore) -> Result<()> {
    write_sheets(path, &store.delta_sheets())
}

pub(crate) fn write_atomically(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| IngestError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let staging = staging_path(path);
    std::fs::write(&staging, contents).map_err(|source| IngestError::Write {
        path: staging.clone(),
        source,
    })?;
    std::fs::rename(&staging, path).map_err(|source| IngestError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".partial");
    path.with_file_name(name)
}
