//! Reconciliation settings.
//!
//! The built-in settings ship as `standards/rd_connect.toml` and are embedded
//! at compile time. A settings file given on the command line replaces them
//! as a whole.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use bbdir_normalize::{MaterialType, MaterialTypes, NormalizerRules};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, StandardsError};

const BUILTIN_CONFIG: &str = include_str!("../../../standards/rd_connect.toml");
const BUILTIN_ORIGIN: &str = "<builtin>/rd_connect.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardsConfig {
    pub identity: IdentityConfig,
    /// Country name to directory country code.
    #[serde(default)]
    pub countries: BTreeMap<String, String>,
    /// OrganizationID to country code.
    #[serde(default)]
    pub country_overrides: BTreeMap<String, String>,
    /// Country name to national node; `""` marks an external affiliate.
    #[serde(default)]
    pub national_nodes: BTreeMap<String, String>,
    #[serde(default)]
    pub national_node_overrides: BTreeMap<String, String>,
    /// OrganizationID to the directory entities it already maps to.
    #[serde(default)]
    pub biobanks: BTreeMap<String, BiobankMapping>,
    #[serde(default)]
    pub materials: BTreeMap<String, MaterialType>,
    #[serde(default)]
    pub catalogue: CatalogueSettings,
    #[serde(default)]
    pub normalizer: NormalizerRules,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityConfig {
    pub authority: String,
    pub scope: String,
    /// Network every imported biobank and collection joins.
    pub network: String,
    #[serde(default = "default_also_known_prefix")]
    pub also_known_prefix: String,
    #[serde(default = "default_also_known_system")]
    pub also_known_system: String,
    /// Finder record type that gets imported.
    #[serde(default = "default_record_type")]
    pub record_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BiobankMapping {
    pub biobank: String,
    #[serde(default)]
    pub collection: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogueSettings {
    /// Prefix rewritten to `ORPHA:` in catalogue disease ids.
    pub orphanet_prefix: String,
    /// Disease ids containing this namespace are ignored.
    pub excluded_namespace: String,
}

impl Default for CatalogueSettings {
    fn default() -> Self {
        Self {
            orphanet_prefix: "urn:miriam:orphanet:".to_string(),
            excluded_namespace: "ncit".to_string(),
        }
    }
}

fn default_also_known_prefix() -> String {
    "rdconnect".to_string()
}

fn default_also_known_system() -> String {
    "RD Connect".to_string()
}

fn default_record_type() -> String {
    "biobank".to_string()
}

impl StandardsConfig {
    /// Settings compiled into the binary.
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN_CONFIG, Path::new(BUILTIN_ORIGIN))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| StandardsError::io(path, e))?;
        Self::from_toml_str(&contents, path)
    }

    /// `path` only labels errors.
    pub fn from_toml_str(contents: &str, path: &Path) -> Result<Self> {
        let config: Self = toml::from_str(contents).map_err(|e| StandardsError::Toml {
            path: PathBuf::from(path),
            source: e,
        })?;
        config.validate()?;
        debug!(
            origin = %path.display(),
            countries = config.countries.len(),
            mapped_biobanks = config.biobanks.len(),
            materials = config.materials.len(),
            "loaded reconciliation settings"
        );
        Ok(config)
    }

    /// Load `path` when given, otherwise the built-in settings.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Self::builtin(),
        }
    }

    pub fn material_types(&self) -> MaterialTypes {
        MaterialTypes::new(self.materials.iter().map(|(name, m)| (name.as_str(), *m)))
    }

    fn validate(&self) -> Result<()> {
        let identity = &self.identity;
        for (field, value) in [
            ("identity.authority", &identity.authority),
            ("identity.scope", &identity.scope),
            ("identity.network", &identity.network),
            ("identity.also_known_prefix", &identity.also_known_prefix),
            ("identity.record_type", &identity.record_type),
            // A blank namespace matches every id and a blank prefix every code.
            ("catalogue.orphanet_prefix", &self.catalogue.orphanet_prefix),
            ("catalogue.excluded_namespace", &self.catalogue.excluded_namespace),
        ] {
            if value.trim().is_empty() {
                return Err(StandardsError::invalid(format!("{field} must not be empty")));
            }
        }
        for (name, code) in self.countries.iter().chain(&self.country_overrides) {
            if code.trim().is_empty() {
                return Err(StandardsError::invalid(format!(
                    "country code for {name} must not be empty"
                )));
            }
        }
        for (org_id, mapping) in &self.biobanks {
            if mapping.biobank.trim().is_empty() {
                return Err(StandardsError::invalid(format!(
                    "biobank mapping for {org_id} has an empty biobank id"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_settings_parse() {
        let config = StandardsConfig::builtin().expect("builtin settings");
        assert_eq!(config.identity.authority, "bbmri-eric");
        assert_eq!(config.countries.get("United Kingdom").map(String::as_str), Some("UK"));
        assert_eq!(config.biobanks.len(), 4);
        assert!(config.normalizer.orphacode.is_denied("sdfsdfs"));
        assert_eq!(config.material_types().lookup("sera"), Some(MaterialType::Serum));
    }
}
