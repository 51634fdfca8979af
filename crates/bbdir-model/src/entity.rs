use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Attribute holding an entity's identity.
pub const ID_ATTRIBUTE: &str = "id";

/// Entity types of the directory, each persisted as one sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Biobank,
    Collection,
    Person,
    AlsoKnownIn,
    Network,
    DiseaseType,
    Country,
}

impl EntityKind {
    pub fn sheet_name(self) -> &'static str {
        match self {
            Self::Biobank => "eu_bbmri_eric_biobanks",
            Self::Collection => "eu_bbmri_eric_collections",
            Self::Person => "eu_bbmri_eric_persons",
            Self::AlsoKnownIn => "eu_bbmri_eric_also_known_in",
            Self::Network => "eu_bbmri_eric_networks",
            Self::DiseaseType => "eu_bbmri_eric_disease_types",
            Self::Country => "eu_bbmri_eric_countries",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sheet_name())
    }
}

/// A directory row: attribute name to typed value.
///
/// Attributes are kept sorted so serialized rows diff cleanly between runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Entity {
    fields: BTreeMap<String, Value>,
}

impl Entity {
    pub fn new(id: impl Into<String>) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(ID_ATTRIBUTE.to_string(), Value::Text(id.into()));
        Self { fields }
    }

    /// Builder-style setter used when assembling new rows.
    #[must_use]
    pub fn with(mut self, attribute: &str, value: impl Into<Value>) -> Self {
        self.set(attribute, value);
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.fields
            .get(ID_ATTRIBUTE)
            .and_then(Value::as_text)
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    pub fn get(&self, attribute: &str) -> Option<&Value> {
        self.fields.get(attribute)
    }

    /// Text of an attribute, empty when absent or non-textual.
    pub fn text(&self, attribute: &str) -> &str {
        self.get(attribute).and_then(Value::as_text).unwrap_or("")
    }

    pub fn set(&mut self, attribute: &str, value: impl Into<Value>) {
        self.fields.insert(attribute.to_string(), value.into());
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl From<BTreeMap<String, Value>> for Entity {
    fn from(fields: BTreeMap<String, Value>) -> Self {
        Self { fields }
    }
}
