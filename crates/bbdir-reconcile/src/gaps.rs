//! Controlled-vocabulary gaps.
//!
//! Every disease, country and network an import attaches goes through
//! [`ReferenceGapTracker::ensure`]: codes already in the vocabulary pass,
//! codes found in a supplemental table are copied into the vocabulary, and
//! anything else is queued for manual curation.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use bbdir_model::{DirectoryStore, EntityKind};
use bbdir_standards::SupplementalTable;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceKind {
    Disease,
    Country,
    Network,
}

impl ReferenceKind {
    pub const ALL: [ReferenceKind; 3] = [
        ReferenceKind::Disease,
        ReferenceKind::Country,
        ReferenceKind::Network,
    ];

    /// Vocabulary sheet holding the known codes.
    pub fn vocabulary(self) -> EntityKind {
        match self {
            Self::Disease => EntityKind::DiseaseType,
            Self::Country => EntityKind::Country,
            Self::Network => EntityKind::Network,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Disease => "disease",
            Self::Country => "country",
            Self::Network => "network",
        }
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GapOutcome {
    Present,
    Backfilled,
    Missing,
}

#[derive(Debug, Clone, Default)]
pub struct ReferenceGapTracker {
    supplemental: BTreeMap<ReferenceKind, SupplementalTable>,
    backfilled: BTreeMap<ReferenceKind, BTreeSet<String>>,
    missing: BTreeMap<ReferenceKind, BTreeSet<String>>,
}

impl ReferenceGapTracker {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_supplemental(mut self, kind: ReferenceKind, table: SupplementalTable) -> Self {
        self.supplemental.insert(kind, table);
        self
    }

    /// Make `code` valid for `kind`, or queue it as missing.
    pub fn ensure(
        &mut self,
        store: &mut DirectoryStore,
        kind: ReferenceKind,
        code: &str,
    ) -> Result<GapOutcome> {
        let code = code.trim();
        let vocabulary = kind.vocabulary();
        if code.is_empty() || store.contains(vocabulary, code) {
            return Ok(GapOutcome::Present);
        }

        if let Some(row) = self.supplemental.get(&kind).and_then(|t| t.get(code)) {
            store.insert(vocabulary, row.clone())?;
            self.backfilled.entry(kind).or_default().insert(code.to_string());
            info!(kind = %kind, code, "backfilled vocabulary entry");
            return Ok(GapOutcome::Backfilled);
        }

        if self.missing.entry(kind).or_default().insert(code.to_string()) {
            debug!(kind = %kind, code, "queued missing reference");
        }
        Ok(GapOutcome::Missing)
    }

    pub fn missing(&self, kind: ReferenceKind) -> impl Iterator<Item = &str> {
        self.missing
            .get(&kind)
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    pub fn report(&self) -> GapReport {
        let collect = |sets: &BTreeMap<ReferenceKind, BTreeSet<String>>| -> BTreeMap<_, Vec<String>> {
            ReferenceKind::ALL
                .into_iter()
                .filter_map(|kind| {
                    let codes = sets.get(&kind)?;
                    (!codes.is_empty()).then(|| (kind, codes.iter().cloned().collect()))
                })
                .collect()
        };
        GapReport {
            backfilled: collect(&self.backfilled),
            missing: collect(&self.missing),
        }
    }
}

/// Codes backfilled or still missing at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GapReport {
    pub backfilled: BTreeMap<ReferenceKind, Vec<String>>,
    pub missing: BTreeMap<ReferenceKind, Vec<String>>,
}

impl fmt::Display for GapReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for kind in ReferenceKind::ALL {
            let backfilled = self.backfilled.get(&kind).map_or(0, Vec::len);
            let missing = self.missing.get(&kind).map_or(&[][..], Vec::as_slice);
            writeln!(
                f,
                "{kind}: {backfilled} backfilled, {} missing",
                missing.len()
            )?;
            for code in missing {
                writeln!(f, "  - {code}")?;
            }
        }
        Ok(())
    }
}
