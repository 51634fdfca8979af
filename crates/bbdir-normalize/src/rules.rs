//! Data-specific patches applied before generic parsing.
//!
//! Source records contain placeholder junk and a handful of malformed codes
//! that no general rule repairs. Both are kept as lookup tables so the list
//! can grow in configuration without touching the parser.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::CodeKind;

/// Deny-list and exact-match corrections for one code kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KindRules {
    /// Literals that normalize to nothing.
    pub deny: BTreeSet<String>,
    /// Exact raw value to its canonical replacement tokens.
    pub corrections: BTreeMap<String, Vec<String>>,
}

impl KindRules {
    pub fn is_denied(&self, value: &str) -> bool {
        self.deny.contains(value)
    }

    pub fn correction(&self, value: &str) -> Option<&[String]> {
        self.corrections.get(value).map(Vec::as_slice)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerRules {
    pub orphacode: KindRules,
    pub icd10: KindRules,
    pub omim: KindRules,
    pub gene: KindRules,
    pub material: KindRules,
}

impl NormalizerRules {
    pub fn for_kind(&self, kind: CodeKind) -> &KindRules {
        match kind {
            CodeKind::Orphacode => &self.orphacode,
            CodeKind::Icd10 => &self.icd10,
            CodeKind::Omim => &self.omim,
            CodeKind::Gene => &self.gene,
            CodeKind::Material => &self.material,
        }
    }
}
