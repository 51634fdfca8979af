//! Replace-and-reload between two stores of the same schema.
//!
//! The destination is emptied children-first, then every entity is copied
//! from the source parent-first. Source rows carry references as nested
//! rows; the destination expects plain ids, so every row is translated
//! using the source's attribute metadata.

use std::fmt;

use bbdir_model::{EntityKind, ID_ATTRIBUTE};
use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::{debug, info, info_span, warn};

use crate::error::{Result, SyncError};
use crate::metadata::{AttributeMeta, FieldType, flatten_attributes};
use crate::store::{EntityStore, QueryArgs, Record, SortOrder, record_id};

/// Most rows sent in one request.
pub const BATCH_SIZE: usize = 1000;

/// Parent-first order; deletion runs in reverse.
pub const SYNC_ORDER: [EntityKind; 5] = [
    EntityKind::Person,
    EntityKind::AlsoKnownIn,
    EntityKind::Network,
    EntityKind::Biobank,
    EntityKind::Collection,
];

pub fn query_args(kind: EntityKind) -> QueryArgs {
    match kind {
        // Sub-collections before the collections they belong to.
        EntityKind::Collection => QueryArgs::sorted_by("parent_collection", SortOrder::Desc),
        _ => QueryArgs::default(),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EntitySync {
    pub entity: String,
    pub deleted: usize,
    pub added: usize,
    pub failed_batches: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub entities: Vec<EntitySync>,
}

impl SyncReport {
    pub fn entity(&self, kind: EntityKind) -> Option<&EntitySync> {
        self.entities.iter().find(|e| e.entity == kind.sheet_name())
    }

    pub fn failed_batches(&self) -> usize {
        self.entities.iter().map(|e| e.failed_batches).sum()
    }

    fn entry(&mut self, kind: EntityKind) -> &mut EntitySync {
        let name = kind.sheet_name();
        match self.entities.iter().position(|e| e.entity == name) {
            Some(idx) => &mut self.entities[idx],
            None => {
                self.entities.push(EntitySync {
                    entity: name.to_string(),
                    ..EntitySync::default()
                });
                let last = self.entities.len() - 1;
                &mut self.entities[last]
            }
        }
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for e in &self.entities {
            writeln!(
                f,
                "{}: deleted {}, added {}, failed batches {}",
                e.entity, e.deleted, e.added, e.failed_batches
            )?;
        }
        Ok(())
    }
}

/// Empty the destination and reload it from the source.
///
/// Metadata and fetch errors abort the sync; a rejected batch is logged and
/// the remaining batches still run.
pub fn sync(source: &dyn EntityStore, dest: &mut dyn EntityStore) -> Result<SyncReport> {
    let mut report = SyncReport::default();

    for kind in SYNC_ORDER.iter().rev().copied() {
        let span = info_span!("delete", entity = %kind);
        let _guard = span.enter();
        let id_attribute = destination_id_attribute(dest, kind)?;
        let existing = dest.fetch_all(kind.sheet_name(), &QueryArgs::default())?;
        let ids: Vec<String> = existing
            .iter()
            .filter_map(|row| record_id(row, &id_attribute))
            .collect();
        let entry = report.entry(kind);
        for batch in ids.chunks(BATCH_SIZE) {
            match dest.delete_list(kind.sheet_name(), batch) {
                Ok(removed) => entry.deleted += removed.len(),
                Err(err) => {
                    warn!(error = %err, rows = batch.len(), "failed to delete batch");
                    entry.failed_batches += 1;
                }
            }
        }
        info!(deleted = entry.deleted, "removed destination rows");
    }

    for kind in SYNC_ORDER {
        let span = info_span!("load", entity = %kind);
        let _guard = span.enter();
        let meta = source.metadata(kind.sheet_name())?;
        let attributes = flatten_attributes(source, &meta.attributes)?;
        let rows = source.fetch_all(kind.sheet_name(), &query_args(kind))?;
        let translated: Vec<Record> = rows
            .iter()
            .map(|row| translate_record(row, &attributes))
            .collect();

        let entry = report.entry(kind);
        for batch in translated.chunks(BATCH_SIZE) {
            match dest.add_all(kind.sheet_name(), batch) {
                Ok(added) => entry.added += added.len(),
                Err(err) => {
                    warn!(error = %err, rows = batch.len(), "failed to add batch");
                    entry.failed_batches += 1;
                }
            }
        }
        info!(added = entry.added, "added destination rows");
    }

    Ok(report)
}

/// Id attribute the destination keys `kind` on; `id` when it has no metadata.
fn destination_id_attribute(dest: &dyn EntityStore, kind: EntityKind) -> Result<String> {
    match dest.metadata(kind.sheet_name()) {
        Ok(meta) => Ok(meta.id_attribute),
        Err(SyncError::UnknownEntity { .. }) => {
            debug!("no destination metadata, deleting by {ID_ATTRIBUTE}");
            Ok(ID_ATTRIBUTE.to_string())
        }
        Err(err) => Err(err),
    }
}

/// Rewrite one source row into the destination representation.
///
/// `attributes` must already be flattened.
pub fn translate_record(source: &Record, attributes: &[AttributeMeta]) -> Record {
    let mut record = Record::new();
    for attribute in attributes {
        let Some(value) = source.get(&attribute.name) else {
            continue;
        };
        let field_type = attribute.field_type;
        let translated = if field_type.is_primitive() {
            value.clone()
        } else if field_type.is_single_reference() {
            reference_id(value, attribute.ref_id_attribute())
        } else if field_type.is_multi_reference() {
            match value {
                JsonValue::Array(items) => JsonValue::Array(
                    items
                        .iter()
                        .map(|item| reference_id(item, attribute.ref_id_attribute()))
                        .filter(|id| !id.is_null())
                        .collect(),
                ),
                JsonValue::Null => JsonValue::Array(Vec::new()),
                other => JsonValue::Array(vec![reference_id(other, attribute.ref_id_attribute())]),
            }
        } else if field_type == FieldType::OneToMany {
            // Computed from the other side of the relation.
            continue;
        } else {
            warn!(attribute = %attribute.name, ?field_type, "skipping attribute of unsupported type");
            continue;
        };
        record.insert(attribute.name.clone(), translated);
    }
    record
}

/// Id of a referenced row; plain ids pass through.
fn reference_id(value: &JsonValue, id_attribute: &str) -> JsonValue {
    match value {
        JsonValue::Object(row) => row.get(id_attribute).cloned().unwrap_or(JsonValue::Null),
        other => other.clone(),
    }
}
