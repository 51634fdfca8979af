//! Stores the sync reads from and writes to.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use bbdir_model::ID_ATTRIBUTE;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use tracing::info;

use crate::error::{Result, SyncError};
use crate::metadata::EntityMeta;

/// One row as exchanged with a store.
pub type Record = Map<String, JsonValue>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryArgs {
    pub sort_column: Option<String>,
    pub sort_order: SortOrder,
}

impl QueryArgs {
    pub fn sorted_by(column: &str, order: SortOrder) -> Self {
        Self {
            sort_column: Some(column.to_string()),
            sort_order: order,
        }
    }
}

pub trait EntityStore {
    fn metadata(&self, entity: &str) -> Result<EntityMeta>;

    fn fetch_all(&self, entity: &str, query: &QueryArgs) -> Result<Vec<Record>>;

    /// Add a batch; returns the ids of the added rows.
    fn add_all(&mut self, entity: &str, records: &[Record]) -> Result<Vec<String>>;

    /// Delete a batch; returns the ids actually removed.
    fn delete_list(&mut self, entity: &str, ids: &[String]) -> Result<Vec<String>>;
}

/// On-disk shape of a [`JsonEntityStore`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreDocument {
    #[serde(default)]
    pub metadata: BTreeMap<String, EntityMeta>,
    #[serde(default)]
    pub data: BTreeMap<String, Vec<Record>>,
}

/// A whole directory held in one JSON document.
///
/// Batches are all-or-nothing: a batch holding an id already present is
/// rejected without adding any of its rows.
#[derive(Debug, Clone, Default)]
pub struct JsonEntityStore {
    path: Option<PathBuf>,
    document: StoreDocument,
}

impl JsonEntityStore {
    pub fn from_document(document: StoreDocument) -> Self {
        Self {
            path: None,
            document,
        }
    }

    pub fn open(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| SyncError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let document = serde_json::from_str(&text).map_err(|source| SyncError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: Some(path.to_path_buf()),
            document,
        })
    }

    pub fn document(&self) -> &StoreDocument {
        &self.document
    }

    pub fn rows(&self, entity: &str) -> &[Record] {
        self.document.data.get(entity).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Write the document back to the file it was opened from.
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        self.save_as(path)
    }

    pub fn save_as(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(&self.document).map_err(|source| SyncError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        write_atomically(path, text.as_bytes())?;
        info!(path = %path.display(), "saved store");
        Ok(())
    }

    fn id_attribute(&self, entity: &str) -> String {
        self.document
            .metadata
            .get(entity)
            .map_or_else(|| ID_ATTRIBUTE.to_string(), |m| m.id_attribute.clone())
    }
}

impl EntityStore for JsonEntityStore {
    fn metadata(&self, entity: &str) -> Result<EntityMeta> {
        self.document
            .metadata
            .get(entity)
            .cloned()
            .ok_or_else(|| SyncError::UnknownEntity {
                entity: entity.to_string(),
            })
    }

    fn fetch_all(&self, entity: &str, query: &QueryArgs) -> Result<Vec<Record>> {
        let mut rows = self.rows(entity).to_vec();
        if let Some(column) = &query.sort_column {
            rows.sort_by(|a, b| {
                let ordering = compare_json(a.get(column), b.get(column));
                match query.sort_order {
                    SortOrder::Asc => ordering,
                    SortOrder::Desc => ordering.reverse(),
                }
            });
        }
        Ok(rows)
    }

    fn add_all(&mut self, entity: &str, records: &[Record]) -> Result<Vec<String>> {
        let id_attribute = self.id_attribute(entity);
        let existing: BTreeSet<String> = self
            .rows(entity)
            .iter()
            .filter_map(|row| record_id(row, &id_attribute))
            .collect();

        let mut ids = Vec::with_capacity(records.len());
        let mut seen = BTreeSet::new();
        for record in records {
            let id = record_id(record, &id_attribute).ok_or_else(|| SyncError::MissingId {
                entity: entity.to_string(),
                attribute: id_attribute.clone(),
            })?;
            if existing.contains(&id) || !seen.insert(id.clone()) {
                return Err(SyncError::Rejected {
                    entity: entity.to_string(),
                    message: format!("duplicate id {id}"),
                });
            }
            ids.push(id);
        }
        self.document
            .data
            .entry(entity.to_string())
            .or_default()
            .extend(records.iter().cloned());
        Ok(ids)
    }

    fn delete_list(&mut self, entity: &str, ids: &[String]) -> Result<Vec<String>> {
        let id_attribute = self.id_attribute(entity);
        let targets: BTreeSet<&str> = ids.iter().map(String::as_str).collect();
        let Some(rows) = self.document.data.get_mut(entity) else {
            return Ok(Vec::new());
        };
        let mut removed = Vec::new();
        rows.retain(|row| match record_id(row, &id_attribute) {
            Some(id) if targets.contains(id.as_str()) => {
                removed.push(id);
                false
            }
            _ => true,
        });
        Ok(removed)
    }
}

/// Write through a `.partial` sibling so a failed save leaves `path` intact.
fn write_atomically(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| SyncError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".partial");
    let staging = path.with_file_name(name);
    std::fs::write(&staging, contents).map_err(|source| SyncError::Write {
        path: staging.clone(),
        source,
    })?;
    std::fs::rename(&staging, path).map_err(|source| SyncError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Id of a record, accepting text or numeric ids.
pub fn record_id(record: &Record, id_attribute: &str) -> Option<String> {
    match record.get(id_attribute)? {
        JsonValue::String(id) if !id.trim().is_empty() => Some(id.clone()),
        JsonValue::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

/// Nulls sort first; mixed kinds compare by their JSON text.
fn compare_json(a: Option<&JsonValue>, b: Option<&JsonValue>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(JsonValue::Number(x)), Some(JsonValue::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(x), Some(y)) => sort_key(x).cmp(&sort_key(y)),
    }
}

fn sort_key(value: &JsonValue) -> String {
    match value {
        JsonValue::String(text) => text.clone(),
        JsonValue::Object(map) => map
            .get(ID_ATTRIBUTE)
            .map_or_else(|| value.to_string(), sort_key),
        other => other.to_string(),
    }
}
