//! Attribute metadata driving record translation.

use bbdir_model::ID_ATTRIBUTE;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::store::EntityStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldType {
    String,
    Text,
    Bool,
    Hyperlink,
    Decimal,
    Long,
    Int,
    Email,
    Date,
    DateTime,
    Xref,
    Categorical,
    Mref,
    CategoricalMref,
    OneToMany,
    Compound,
    #[serde(other)]
    Unsupported,
}

impl FieldType {
    /// Copied as-is.
    pub fn is_primitive(self) -> bool {
        matches!(
            self,
            Self::String
                | Self::Text
                | Self::Bool
                | Self::Hyperlink
                | Self::Decimal
                | Self::Long
                | Self::Int
                | Self::Email
                | Self::Date
                | Self::DateTime
        )
    }

    pub fn is_single_reference(self) -> bool {
        matches!(self, Self::Xref | Self::Categorical)
    }

    pub fn is_multi_reference(self) -> bool {
        matches!(self, Self::Mref | Self::CategoricalMref)
    }

    pub fn is_reference(self) -> bool {
        self.is_single_reference() || self.is_multi_reference()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefEntity {
    /// Referenced entity type, used to look up its id attribute.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "idAttribute", default)]
    pub id_attribute: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeMeta {
    pub name: String,
    #[serde(rename = "fieldType")]
    pub field_type: FieldType,
    #[serde(rename = "refEntity", default)]
    pub ref_entity: Option<RefEntity>,
    /// Children of a compound attribute.
    #[serde(default)]
    pub attributes: Vec<AttributeMeta>,
}

impl AttributeMeta {
    /// Attribute of referenced rows holding their id.
    pub fn ref_id_attribute(&self) -> &str {
        self.ref_entity
            .as_ref()
            .and_then(|r| r.id_attribute.as_deref())
            .unwrap_or(ID_ATTRIBUTE)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMeta {
    #[serde(rename = "idAttribute", default = "default_id_attribute")]
    pub id_attribute: String,
    pub attributes: Vec<AttributeMeta>,
}

fn default_id_attribute() -> String {
    ID_ATTRIBUTE.to_string()
}

/// Flatten compound attributes into their children and complete the id
/// attribute of every reference from the referenced entity's metadata.
pub fn flatten_attributes(
    store: &dyn EntityStore,
    attributes: &[AttributeMeta],
) -> Result<Vec<AttributeMeta>> {
    let mut flat = Vec::new();
    let mut pending: Vec<&AttributeMeta> = attributes.iter().rev().collect();
    while let Some(attribute) = pending.pop() {
        if attribute.field_type == FieldType::Compound {
            pending.extend(attribute.attributes.iter().rev());
            continue;
        }
        let mut attribute = attribute.clone();
        if attribute.field_type.is_reference() {
            complete_ref_id(store, &mut attribute)?;
        }
        flat.push(attribute);
    }
    Ok(flat)
}

fn complete_ref_id(store: &dyn EntityStore, attribute: &mut AttributeMeta) -> Result<()> {
    let Some(reference) = attribute.ref_entity.as_mut() else {
        return Ok(());
    };
    if reference.id_attribute.is_some() {
        return Ok(());
    }
    if let Some(entity) = reference.name.as_deref() {
        reference.id_attribute = Some(store.metadata(entity)?.id_attribute);
    }
    Ok(())
}
