#![deny(unsafe_code)]

pub mod codes;
pub mod material;
pub mod rules;
pub mod tokenizer;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use codes::{
    ICD_PREFIX, ICD10_MAX_LEN, ICD10CM_PREFIX, Normalizer, OMIM_PREFIX, ORPHA_PREFIX,
};
pub use material::{MaterialType, MaterialTypes};
pub use rules::{KindRules, NormalizerRules};
pub use tokenizer::split_segments;

/// Kind of free-text code field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeKind {
    Orphacode,
    Icd10,
    Omim,
    Gene,
    Material,
}

impl CodeKind {
    pub const ALL: [CodeKind; 5] = [
        CodeKind::Orphacode,
        CodeKind::Icd10,
        CodeKind::Omim,
        CodeKind::Gene,
        CodeKind::Material,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Orphacode => "orphacode",
            Self::Icd10 => "icd10",
            Self::Omim => "omim",
            Self::Gene => "gene",
            Self::Material => "material",
        }
    }
}

impl fmt::Display for CodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CodeKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| format!("unknown code kind: {value}"))
    }
}
