//! Supplemental reference tables.
//!
//! Semicolon-delimited CSV files holding vocabulary rows that are not yet in
//! the directory. Every file must carry an `id` column; the remaining
//! columns are copied onto the backfilled row as text.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use bbdir_model::{Entity, ID_ATTRIBUTE, Value};
use csv::ReaderBuilder;
use tracing::warn;

use crate::error::{Result, StandardsError};

pub const SUPPLEMENTAL_DELIMITER: u8 = b';';

#[derive(Debug, Clone, Default)]
pub struct SupplementalTable {
    source: Option<PathBuf>,
    rows: BTreeMap<String, Entity>,
}

impl SupplementalTable {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(|e| StandardsError::io(path, e))?;
        let mut table = Self::from_reader(file, path)?;
        table.source = Some(path.to_path_buf());
        Ok(table)
    }

    /// Load `path` if it exists, otherwise an empty table.
    pub fn load_optional(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::empty())
        }
    }

    /// `origin` only labels errors.
    pub fn from_reader<R: Read>(reader: R, origin: &Path) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .delimiter(SUPPLEMENTAL_DELIMITER)
            .from_reader(reader);

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| StandardsError::csv(origin, e))?
            .iter()
            .map(|h| h.trim_matches('\u{feff}').trim().to_string())
            .collect();
        let Some(id_index) = headers.iter().position(|h| h == ID_ATTRIBUTE) else {
            return Err(StandardsError::MissingColumn {
                path: origin.to_path_buf(),
                column: ID_ATTRIBUTE.to_string(),
            });
        };

        let mut rows = BTreeMap::new();
        for record in reader.records() {
            let record = record.map_err(|e| StandardsError::csv(origin, e))?;
            let id = record.get(id_index).unwrap_or("").trim();
            if id.is_empty() {
                continue;
            }
            if rows.contains_key(id) {
                warn!(path = %origin.display(), id, "duplicate supplemental row ignored");
                continue;
            }
            let mut entity = Entity::new(id);
            for (idx, value) in record.iter().enumerate() {
                let Some(header) = headers.get(idx) else {
                    continue;
                };
                if idx == id_index || header.is_empty() {
                    continue;
                }
                entity.set(header, Value::text_or_null(value.trim()));
            }
            rows.insert(id.to_string(), entity);
        }

        Ok(Self { source: None, rows })
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn get(&self, id: &str) -> Option<&Entity> {
        self.rows.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.rows.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.rows.keys().map(String::as_str)
    }
}
