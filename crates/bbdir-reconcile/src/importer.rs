//! Import driver: one finder record at a time into the store.

use std::collections::BTreeMap;

use bbdir_ingest::FinderRecord;
use bbdir_model::{DirectoryStore, EntityKind};
use serde::Serialize;
use tracing::{info, info_span};

use crate::error::Result;
use crate::gaps::{GapReport, ReferenceGapTracker};
use crate::merge::MergeEngine;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EntityCounts {
    pub created: usize,
    pub updated: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub records: usize,
    /// Records whose catalogue lookup failed.
    pub catalogue_degraded: usize,
    pub entities: BTreeMap<EntityKind, EntityCounts>,
    pub gaps: GapReport,
}

impl ImportSummary {
    pub fn created(&self, kind: EntityKind) -> usize {
        self.entities.get(&kind).map_or(0, |c| c.created)
    }

    pub fn updated(&self, kind: EntityKind) -> usize {
        self.entities.get(&kind).map_or(0, |c| c.updated)
    }
}

pub struct Importer<'a> {
    engine: MergeEngine<'a>,
    gaps: ReferenceGapTracker,
}

impl<'a> Importer<'a> {
    pub fn new(engine: MergeEngine<'a>, gaps: ReferenceGapTracker) -> Self {
        Self { engine, gaps }
    }

    pub fn gaps(&self) -> &ReferenceGapTracker {
        &self.gaps
    }

    /// Merge every record in order. The first failing record aborts the run.
    pub fn run(&mut self, store: &mut DirectoryStore, records: &[FinderRecord]) -> Result<ImportSummary> {
        let mut summary = ImportSummary::default();
        for record in records {
            let span = info_span!("record", org_id = %record.organization_id);
            let _guard = span.enter();

            let outcome = self.engine.merge_record(store, &mut self.gaps, record)?;
            summary.records += 1;
            if outcome.catalogue_degraded {
                summary.catalogue_degraded += 1;
            }
            for (kind, _) in &outcome.created {
                summary.entities.entry(*kind).or_default().created += 1;
            }
            for (kind, _) in &outcome.updated {
                summary.entities.entry(*kind).or_default().updated += 1;
            }
            info!(
                created = outcome.created.len(),
                updated = outcome.updated.len(),
                "merged record"
            );
        }
        summary.gaps = self.gaps.report();
        Ok(summary)
    }

    pub fn into_gaps(self) -> ReferenceGapTracker {
        self.gaps
    }
}
