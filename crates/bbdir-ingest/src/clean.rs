//! Clean pass over a finder export.
//!
//! Rewrites every code field into its normalized token list and decodes the
//! biomaterial list, leaving all other fields as they were.

use bbdir_normalize::{CodeKind, Normalizer};
use tracing::debug;

use crate::error::{IngestError, Result};
use crate::finder::{Biomaterials, FinderRecord};

pub fn clean_record(record: &FinderRecord, normalizer: &Normalizer) -> Result<FinderRecord> {
    let mut cleaned = record.clone();
    for disease in &mut cleaned.diseases {
        disease.orphacode = disease.orphacode.cleaned(CodeKind::Orphacode, normalizer);
        disease.icd10 = disease.icd10.cleaned(CodeKind::Icd10, normalizer);
        disease.omim = disease.omim.cleaned(CodeKind::Omim, normalizer);
        disease.gene = disease.gene.cleaned(CodeKind::Gene, normalizer);
    }
    let core = &mut cleaned.bb_core;
    core.additional_biomaterial_available = core
        .additional_biomaterial_available
        .cleaned(CodeKind::Material, normalizer);
    let names = core
        .biomaterial_available
        .names()
        .map_err(|source| IngestError::InvalidBiomaterials {
            organization: record.org_key(),
            source,
        })?;
    core.biomaterial_available = Biomaterials::List(names);
    debug!(organization = %record.organization_id, "cleaned finder record");
    Ok(cleaned)
}

pub fn clean_records(records: &[FinderRecord], normalizer: &Normalizer) -> Result<Vec<FinderRecord>> {
    records
        .iter()
        .map(|record| clean_record(record, normalizer))
        .collect()
}
