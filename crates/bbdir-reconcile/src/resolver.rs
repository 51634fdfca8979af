//! Canonical directory identifiers for finder organizations.
//!
//! Every lookup consults the per-organization overrides first and falls
//! back to a table or a deterministic synthesis, so the same organization
//! always resolves to the same ids.

use std::collections::BTreeMap;

use bbdir_standards::{BiobankMapping, IdentityConfig, StandardsConfig};

use crate::error::{ReconcileError, Result};

#[derive(Debug, Clone)]
pub struct IdentityResolver {
    identity: IdentityConfig,
    countries: BTreeMap<String, String>,
    country_overrides: BTreeMap<String, String>,
    national_nodes: BTreeMap<String, String>,
    national_node_overrides: BTreeMap<String, String>,
    biobanks: BTreeMap<String, BiobankMapping>,
}

impl IdentityResolver {
    pub fn from_config(config: &StandardsConfig) -> Self {
        Self {
            identity: config.identity.clone(),
            countries: config.countries.clone(),
            country_overrides: config.country_overrides.clone(),
            national_nodes: config.national_nodes.clone(),
            national_node_overrides: config.national_node_overrides.clone(),
            biobanks: config.biobanks.clone(),
        }
    }

    pub fn identity(&self) -> &IdentityConfig {
        &self.identity
    }

    /// Network every imported entity joins.
    pub fn network(&self) -> &str {
        &self.identity.network
    }

    pub fn country_code(&self, org_id: &str, country_name: &str) -> Result<String> {
        if let Some(code) = self.country_overrides.get(org_id) {
            return Ok(code.clone());
        }
        self.countries
            .get(country_name.trim())
            .cloned()
            .ok_or_else(|| ReconcileError::UnknownCountry {
                organization: org_id.to_string(),
                country: country_name.to_string(),
            })
    }

    /// Empty when the organization has no national node.
    pub fn national_node(&self, org_id: &str, country_name: &str) -> String {
        self.national_node_overrides
            .get(org_id)
            .or_else(|| self.national_nodes.get(country_name.trim()))
            .cloned()
            .unwrap_or_default()
    }

    /// Whether the organization already has a directory biobank.
    pub fn is_mapped(&self, org_id: &str) -> bool {
        self.biobanks.contains_key(org_id)
    }

    pub fn biobank_id(&self, org_id: &str) -> String {
        match self.biobanks.get(org_id) {
            Some(mapping) => mapping.biobank.clone(),
            None => format!(
                "{}:ID:{}_{}",
                self.identity.authority, self.identity.scope, org_id
            ),
        }
    }

    pub fn collection_id(&self, org_id: &str) -> String {
        match self.biobanks.get(org_id) {
            Some(BiobankMapping {
                collection: Some(collection),
                ..
            }) => collection.clone(),
            Some(mapping) => format!("{}:collection:{}", mapping.biobank, org_id),
            None => format!("{}:collection:MainCollection", self.biobank_id(org_id)),
        }
    }

    pub fn contact_id(&self, org_id: &str) -> String {
        format!(
            "{}:contactID:{}_{}",
            self.identity.authority, self.identity.scope, org_id
        )
    }

    pub fn also_known_id(&self, org_id: &str) -> String {
        format!("{}:{}", self.identity.also_known_prefix, org_id)
    }
}
