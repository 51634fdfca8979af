//! In-memory directory store.
//!
//! The store owns every directory table for the duration of a run. All
//! mutations go through it so id uniqueness and the biobank/collection
//! back-reference stay enforced in one place.

use std::collections::{BTreeMap, BTreeSet};

use crate::entity::{Entity, EntityKind};
use crate::error::{ModelError, Result};
use crate::tokens::{split_tokens, union_tokens};
use crate::value::Value;

/// Sheet name to rows, the shape the workbook is persisted in.
pub type Sheets = BTreeMap<String, Vec<Entity>>;

/// Attribute on a biobank listing its collections.
pub const BIOBANK_COLLECTIONS: &str = "collections";
/// Attribute on a collection referencing its biobank.
pub const COLLECTION_BIOBANK: &str = "biobank";

/// Rows of one sheet with an id index.
#[derive(Debug, Clone, Default)]
pub struct Table {
    rows: Vec<Entity>,
    index: BTreeMap<String, usize>,
}

impl Table {
    fn from_rows(sheet: &str, rows: Vec<Entity>) -> Result<Self> {
        let mut table = Self::default();
        for (row, entity) in rows.into_iter().enumerate() {
            if entity.id().is_none() {
                return Err(ModelError::MissingId {
                    sheet: sheet.to_string(),
                    row,
                });
            }
            table.push(sheet, entity)?;
        }
        Ok(table)
    }

    fn push(&mut self, sheet: &str, entity: Entity) -> Result<()> {
        let id = entity
            .id()
            .ok_or_else(|| ModelError::MissingId {
                sheet: sheet.to_string(),
                row: self.rows.len(),
            })?
            .to_string();
        if self.index.contains_key(&id) {
            return Err(ModelError::DuplicateId {
                sheet: sheet.to_string(),
                id,
            });
        }
        self.index.insert(id, self.rows.len());
        self.rows.push(entity);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Entity> {
        self.index.get(id).map(|&idx| &self.rows[idx])
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut Entity> {
        self.index.get(id).map(|&idx| &mut self.rows[idx])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn rows(&self) -> &[Entity] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Ids created or patched in one sheet during the run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub created: BTreeSet<String>,
    pub updated: BTreeSet<String>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.updated.is_empty()
    }

    fn touches(&self, id: &str) -> bool {
        self.created.contains(id) || self.updated.contains(id)
    }
}

#[derive(Debug, Clone, Default)]
pub struct DirectoryStore {
    tables: BTreeMap<String, Table>,
    changes: BTreeMap<String, ChangeSet>,
}

impl DirectoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from loaded sheets, validating ids per sheet.
    pub fn from_sheets(sheets: Sheets) -> Result<Self> {
        let mut tables = BTreeMap::new();
        for (sheet, rows) in sheets {
            let table = Table::from_rows(&sheet, rows)?;
            tables.insert(sheet, table);
        }
        Ok(Self {
            tables,
            changes: BTreeMap::new(),
        })
    }

    /// Every sheet with its current rows, including sheets the
    /// reconciliation never touches.
    pub fn to_sheets(&self) -> Sheets {
        self.tables
            .iter()
            .map(|(sheet, table)| (sheet.clone(), table.rows.clone()))
            .collect()
    }

    /// Only the rows created or updated during this run, per sheet.
    pub fn delta_sheets(&self) -> Sheets {
        let mut sheets = Sheets::new();
        for (sheet, changes) in &self.changes {
            if changes.is_empty() {
                continue;
            }
            let Some(table) = self.tables.get(sheet) else {
                continue;
            };
            let rows: Vec<Entity> = table
                .rows
                .iter()
                .filter(|row| row.id().is_some_and(|id| changes.touches(id)))
                .cloned()
                .collect();
            sheets.insert(sheet.clone(), rows);
        }
        sheets
    }

    pub fn table(&self, kind: EntityKind) -> Option<&Table> {
        self.tables.get(kind.sheet_name())
    }

    pub fn rows(&self, kind: EntityKind) -> &[Entity] {
        self.table(kind).map(Table::rows).unwrap_or(&[])
    }

    pub fn len(&self, kind: EntityKind) -> usize {
        self.table(kind).map_or(0, Table::len)
    }

    pub fn contains(&self, kind: EntityKind, id: &str) -> bool {
        self.table(kind).is_some_and(|table| table.contains(id))
    }

    pub fn get(&self, kind: EntityKind, id: &str) -> Option<&Entity> {
        self.table(kind).and_then(|table| table.get(id))
    }

    pub fn changes(&self, kind: EntityKind) -> Option<&ChangeSet> {
        self.changes.get(kind.sheet_name())
    }

    pub fn has_changes(&self) -> bool {
        self.changes.values().any(|changes| !changes.is_empty())
    }

    /// Insert a new row. Fails when the id already exists in the sheet.
    pub fn insert(&mut self, kind: EntityKind, entity: Entity) -> Result<()> {
        let sheet = kind.sheet_name();
        let id = entity
            .id()
            .map(str::to_string)
            .ok_or_else(|| ModelError::MissingId {
                sheet: sheet.to_string(),
                row: self.len(kind),
            })?;
        self.tables
            .entry(sheet.to_string())
            .or_default()
            .push(sheet, entity)?;
        self.changes
            .entry(sheet.to_string())
            .or_default()
            .created
            .insert(id);
        Ok(())
    }

    /// Union new tokens into a multi-valued attribute of an existing row.
    ///
    /// The resulting cell is sorted and unique. Returns whether the cell
    /// changed; merging tokens already present is a no-op.
    pub fn union_merge<I, S>(
        &mut self,
        kind: EntityKind,
        id: &str,
        attribute: &str,
        tokens: I,
    ) -> Result<bool>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let sheet = kind.sheet_name();
        let entity = self
            .tables
            .get_mut(sheet)
            .and_then(|table| table.get_mut(id))
            .ok_or_else(|| ModelError::NotFound {
                sheet: sheet.to_string(),
                id: id.to_string(),
            })?;

        let current = entity.get(attribute).cloned().unwrap_or_default();
        let merged = union_tokens(&current.render(), tokens);
        let next = match current {
            Value::Refs(_) => Value::Refs(split_tokens(&merged).into_iter().collect()),
            _ if merged.is_empty() => current.clone(),
            _ => Value::Text(merged),
        };
        if next == current {
            return Ok(false);
        }
        entity.set(attribute, next);

        let changes = self.changes.entry(sheet.to_string()).or_default();
        if !changes.created.contains(id) {
            changes.updated.insert(id.to_string());
        }
        Ok(true)
    }

    /// Insert a collection and register it on its biobank.
    ///
    /// The collection's `biobank` attribute must name a biobank already in
    /// the store; the biobank's `collections` attribute gains the new id.
    pub fn insert_collection(&mut self, collection: Entity) -> Result<()> {
        let collection_id = collection.id().unwrap_or_default().to_string();
        let biobank_id = collection.text(COLLECTION_BIOBANK).trim().to_string();
        if biobank_id.is_empty() {
            return Err(ModelError::MissingBiobankReference {
                collection: collection_id,
            });
        }
        if !self.contains(EntityKind::Biobank, &biobank_id) {
            return Err(ModelError::UnknownBiobank {
                collection: collection_id,
                biobank: biobank_id,
            });
        }
        self.insert(EntityKind::Collection, collection)?;
        self.union_merge(
            EntityKind::Biobank,
            &biobank_id,
            BIOBANK_COLLECTIONS,
            [collection_id.as_str()],
        )?;
        Ok(())
    }
}
