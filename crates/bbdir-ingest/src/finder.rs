//! RD-Connect Finder export.
//!
//! The export is `{ "allData": [ ... ] }`. Only records of the configured
//! type are decoded into [`FinderRecord`]; every field the importer reads is
//! required, so a record missing one fails the whole run. Unread fields are
//! carried along untouched so a cleaned export keeps them.
//!
//! Code fields accept both the raw free text of a fresh export and the token
//! lists written by the clean pass.

use std::fmt;
use std::path::Path;

use bbdir_normalize::{CodeKind, Normalizer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use tracing::debug;

use crate::error::{IngestError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OrganizationId {
    Number(i64),
    Text(String),
}

impl OrganizationId {
    /// Key used for mapping and override lookups.
    pub fn key(&self) -> String {
        match self {
            Self::Number(id) => id.to_string(),
            Self::Text(id) => id.trim().to_string(),
        }
    }
}

impl fmt::Display for OrganizationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

/// A free-text code field, or the tokens it was already cleaned into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CodeField {
    Raw(String),
    Tokens(Vec<String>),
}

impl Default for CodeField {
    fn default() -> Self {
        Self::Raw(String::new())
    }
}

impl CodeField {
    pub fn tokens(&self, kind: CodeKind, normalizer: &Normalizer) -> Vec<String> {
        match self {
            Self::Raw(raw) => normalizer.normalize(kind, raw),
            Self::Tokens(tokens) => tokens
                .iter()
                .map(|t| t.trim())
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn cleaned(&self, kind: CodeKind, normalizer: &Normalizer) -> Self {
        Self::Tokens(self.tokens(kind, normalizer))
    }
}

/// `Biomaterial_Available`: a JSON-encoded list in raw exports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Biomaterials {
    Encoded(String),
    List(Vec<String>),
}

impl Biomaterials {
    pub fn names(&self) -> std::result::Result<Vec<String>, serde_json::Error> {
        match self {
            Self::Encoded(text) if text.trim().is_empty() => Ok(Vec::new()),
            Self::Encoded(text) => serde_json::from_str(text),
            Self::List(names) => Ok(names.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DonorCount {
    Number(i64),
    Text(String),
}

impl DonorCount {
    /// Blank counts are zero.
    pub fn value(&self) -> Option<u64> {
        match self {
            Self::Number(n) => u64::try_from(*n).ok(),
            Self::Text(text) if text.trim().is_empty() => Some(0),
            Self::Text(text) => text.trim().parse().ok(),
        }
    }

    fn raw(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(text) => text.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinderRecord {
    #[serde(rename = "OrganizationID")]
    pub organization_id: OrganizationId,
    #[serde(rename = "type")]
    pub record_type: String,
    pub name: String,
    pub url: Vec<String>,
    pub address: Address,
    #[serde(rename = "main contact")]
    pub main_contact: MainContact,
    pub bb_core: BiobankCore,
    pub diseases: Vec<DiseaseEntry>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub country: String,
    #[serde(rename = "name of host institution")]
    pub host_institution: String,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MainContact {
    #[serde(rename = "first name")]
    pub first_name: String,
    #[serde(rename = "last name")]
    pub last_name: String,
    pub email: String,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiobankCore {
    pub acronym: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Biomaterial_Available")]
    pub biomaterial_available: Biomaterials,
    #[serde(rename = "Additional_Biomaterial_available")]
    pub additional_biomaterial_available: CodeField,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseaseEntry {
    pub orphacode: CodeField,
    pub icd10: CodeField,
    pub omim: CodeField,
    pub gene: CodeField,
    pub number: DonorCount,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl FinderRecord {
    pub fn org_key(&self) -> String {
        self.organization_id.key()
    }

    /// First listed URL, empty when none.
    pub fn primary_url(&self) -> &str {
        self.url.first().map(String::as_str).unwrap_or("")
    }

    /// Sum of the per-disease donor counts.
    pub fn donor_count(&self) -> Result<u64> {
        let mut total = 0u64;
        for disease in &self.diseases {
            let count = disease
                .number
                .value()
                .ok_or_else(|| IngestError::InvalidDonorCount {
                    organization: self.org_key(),
                    value: disease.number.raw(),
                })?;
            total = total.saturating_add(count);
        }
        Ok(total)
    }

    /// Declared biomaterial names, both the fixed list and the free text.
    pub fn biomaterial_names(&self, normalizer: &Normalizer) -> Result<Vec<String>> {
        let mut names = self
            .bb_core
            .biomaterial_available
            .names()
            .map_err(|source| IngestError::InvalidBiomaterials {
                organization: self.org_key(),
                source,
            })?;
        names.extend(
            self.bb_core
                .additional_biomaterial_available
                .tokens(CodeKind::Material, normalizer),
        );
        Ok(names)
    }
}

/// Decode the records of `record_type` from an export document.
///
/// `origin` only labels errors.
pub fn parse_finder(text: &str, origin: &Path, record_type: &str) -> Result<Vec<FinderRecord>> {
    #[derive(Deserialize)]
    struct Export {
        #[serde(rename = "allData")]
        all_data: Vec<JsonValue>,
    }

    let export: Export = serde_json::from_str(text).map_err(|source| IngestError::Json {
        path: origin.to_path_buf(),
        source,
    })?;

    let total = export.all_data.len();
    let mut records = Vec::new();
    for raw in export.all_data {
        let kind = raw.get("type").and_then(JsonValue::as_str).unwrap_or("");
        if kind != record_type {
            continue;
        }
        let organization = match raw.get("OrganizationID") {
            Some(JsonValue::String(id)) => id.clone(),
            Some(other) => other.to_string(),
            None => "<unknown>".to_string(),
        };
        let record = serde_json::from_value(raw)
            .map_err(|source| IngestError::Record { organization, source })?;
        records.push(record);
    }
    debug!(total, selected = records.len(), record_type, "decoded finder export");
    Ok(records)
}

pub fn load_finder(path: &Path, record_type: &str) -> Result<Vec<FinderRecord>> {
    let text = std::fs::read_to_string(path).map_err(|source| IngestError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_finder(&text, path, record_type)
}

/// Write records back as an export document.
pub fn write_finder(path: &Path, records: &[FinderRecord]) -> Result<()> {
    #[derive(Serialize)]
    struct ExportRef<'a> {
        #[serde(rename = "allData")]
        all_data: &'a [FinderRecord],
    }

    let text = serde_json::to_string_pretty(&ExportRef { all_data: records }).map_err(|source| {
        IngestError::Json {
            path: path.to_path_buf(),
            source,
        }
    })?;
    crate::workbook::write_atomically(path, text.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn donor_counts_accept_numbers_and_text() {
        assert_eq!(DonorCount::Number(12).value(), Some(12));
        assert_eq!(DonorCount::Text(" 7 ".into()).value(), Some(7));
        assert_eq!(DonorCount::Text(String::new()).value(), Some(0));
        assert_eq!(DonorCount::Text("many".into()).value(), None);
        assert_eq!(DonorCount::Number(-1).value(), None);
    }

    #[test]
    fn biomaterials_decode_encoded_lists() {
        let encoded = Biomaterials::Encoded(r#"["DNA", "Serum"]"#.into());
        assert_eq!(encoded.names().expect("names"), vec!["DNA", "Serum"]);
        assert!(Biomaterials::Encoded("[oops".into()).names().is_err());
    }

    #[test]
    fn organization_ids_share_one_key() {
        let number: OrganizationId = serde_json::from_str("173631").expect("number");
        let text: OrganizationId = serde_json::from_str(r#""173631""#).expect("text");
        assert_eq!(number.key(), text.key());
    }
}
