//! Biomaterial lookup.
//!
//! Free-text biomaterial names are mapped onto the directory's fixed
//! material-type enumeration. Names outside the lookup table are dropped.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaterialType {
    CellLines,
    Dna,
    Other,
    Plasma,
    Rna,
    Saliva,
    Serum,
    TissueParaffinEmbedded,
    Urine,
    WholeBlood,
}

impl MaterialType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CellLines => "CELL_LINES",
            Self::Dna => "DNA",
            Self::Other => "OTHER",
            Self::Plasma => "PLASMA",
            Self::Rna => "RNA",
            Self::Saliva => "SALIVA",
            Self::Serum => "SERUM",
            Self::TissueParaffinEmbedded => "TISSUE_PARAFFIN_EMBEDDED",
            Self::Urine => "URINE",
            Self::WholeBlood => "WHOLE_BLOOD",
        }
    }
}

impl fmt::Display for MaterialType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upper-cased source name to material type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaterialTypes {
    by_name: BTreeMap<String, MaterialType>,
}

impl MaterialTypes {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, MaterialType)>,
        S: AsRef<str>,
    {
        let by_name = entries
            .into_iter()
            .map(|(name, material)| (name.as_ref().trim().to_uppercase(), material))
            .collect();
        Self { by_name }
    }

    pub fn lookup(&self, name: &str) -> Option<MaterialType> {
        self.by_name.get(&name.trim().to_uppercase()).copied()
    }

    /// Map every known name; unknown names are skipped.
    pub fn map_all<I, S>(&self, names: I) -> BTreeSet<MaterialType>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut materials = BTreeSet::new();
        for name in names {
            let name = name.as_ref();
            match self.lookup(name) {
                Some(material) => {
                    materials.insert(material);
                }
                None => debug!(material = name, "dropping unknown biomaterial"),
            }
        }
        materials
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive_and_drops_unknown() {
        let types = MaterialTypes::new([
            ("Whole blood", MaterialType::WholeBlood),
            ("SERA", MaterialType::Serum),
            ("serum", MaterialType::Serum),
        ]);
        assert_eq!(types.lookup("WHOLE BLOOD"), Some(MaterialType::WholeBlood));
        let mapped = types.map_all(["sera", "Serum", "feathers"]);
        assert_eq!(mapped.into_iter().collect::<Vec<_>>(), vec![MaterialType::Serum]);
    }
}
