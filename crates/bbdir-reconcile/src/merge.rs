//! Create-or-update of directory entities for one finder record.
//!
//! Absent entities are created with every resolved field. Present entities
//! only ever gain tokens in their accumulating fields; all other fields keep
//! the value they were first written with.

use std::collections::BTreeSet;

use bbdir_ingest::{FinderRecord, SampleCatalogue};
use bbdir_model::{BIOBANK_COLLECTIONS, DirectoryStore, Entity, EntityKind, Value, join_tokens};
use bbdir_normalize::{CodeKind, MaterialTypes, Normalizer, ORPHA_PREFIX};
use bbdir_standards::CatalogueSettings;
use tracing::{debug, warn};

use crate::error::Result;
use crate::gaps::{ReferenceGapTracker, ReferenceKind};
use crate::resolver::IdentityResolver;

/// Biobank fields that accumulate across imports.
pub const BIOBANK_ACCUMULATING: &[&str] = &["network"];
/// Collection fields that accumulate across imports.
pub const COLLECTION_ACCUMULATING: &[&str] =
    &["network", "combined_network", "also_known", "diagnosis_available"];

pub const MAIN_COLLECTION_NAME: &str = "Main Collection";
pub const COLLECTION_TYPE: &str = "RD";
pub const DATA_CATEGORIES: &str = "BIOLOGICAL_SAMPLES,OTHER";

/// Base-10 order of magnitude of a donor count, counting at least one donor.
pub fn order_of_magnitude(donors: u64) -> i64 {
    i64::from(donors.max(1).ilog10())
}

/// Identifiers and derived values of one record.
#[derive(Debug, Clone)]
pub struct ResolvedRecord {
    pub organization: String,
    pub country: String,
    pub national_node: String,
    pub biobank_id: String,
    pub collection_id: String,
    pub contact_id: String,
    pub also_known_id: String,
    pub diseases: BTreeSet<String>,
    pub materials: BTreeSet<String>,
    pub donors: u64,
}

/// What one record did to the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordOutcome {
    pub created: Vec<(EntityKind, String)>,
    pub updated: Vec<(EntityKind, String)>,
    /// The catalogue lookup failed and only local codes were used.
    pub catalogue_degraded: bool,
}

impl RecordOutcome {
    pub fn is_noop(&self) -> bool {
        self.created.is_empty() && self.updated.is_empty()
    }
}

pub struct MergeEngine<'a> {
    resolver: &'a IdentityResolver,
    normalizer: &'a Normalizer,
    materials: &'a MaterialTypes,
    catalogue: &'a dyn SampleCatalogue,
    catalogue_settings: &'a CatalogueSettings,
}

impl<'a> MergeEngine<'a> {
    pub fn new(
        resolver: &'a IdentityResolver,
        normalizer: &'a Normalizer,
        materials: &'a MaterialTypes,
        catalogue: &'a dyn SampleCatalogue,
        catalogue_settings: &'a CatalogueSettings,
    ) -> Self {
        Self {
            resolver,
            normalizer,
            materials,
            catalogue,
            catalogue_settings,
        }
    }

    pub fn merge_record(
        &self,
        store: &mut DirectoryStore,
        gaps: &mut ReferenceGapTracker,
        record: &FinderRecord,
    ) -> Result<RecordOutcome> {
        let mut outcome = RecordOutcome::default();
        let resolved = self.resolve(record, &mut outcome)?;

        gaps.ensure(store, ReferenceKind::Country, &resolved.country)?;
        gaps.ensure(store, ReferenceKind::Network, self.resolver.network())?;
        for disease in &resolved.diseases {
            gaps.ensure(store, ReferenceKind::Disease, disease)?;
        }

        self.merge_contact(store, record, &resolved, &mut outcome)?;
        self.merge_also_known(store, &resolved, &mut outcome)?;
        self.merge_biobank(store, record, &resolved, &mut outcome)?;
        self.merge_collection(store, record, &resolved, &mut outcome)?;
        Ok(outcome)
    }

    /// Resolve identifiers and aggregate codes without touching the store.
    pub fn resolve(
        &self,
        record: &FinderRecord,
        outcome: &mut RecordOutcome,
    ) -> Result<ResolvedRecord> {
        let organization = record.org_key();
        let country_name = record.address.country.as_str();
        let country = self.resolver.country_code(&organization, country_name)?;

        let mut diseases = self.local_diseases(record);
        match self.catalogue_diseases(&organization) {
            Ok(remote) => diseases.extend(remote),
            Err(err) => {
                warn!(organization = %organization, error = %err, "sample catalogue lookup failed");
                outcome.catalogue_degraded = true;
            }
        }

        let names = record.biomaterial_names(self.normalizer)?;
        let materials = self
            .materials
            .map_all(&names)
            .into_iter()
            .map(|m| m.as_str().to_string())
            .collect();

        Ok(ResolvedRecord {
            national_node: self.resolver.national_node(&organization, country_name),
            biobank_id: self.resolver.biobank_id(&organization),
            collection_id: self.resolver.collection_id(&organization),
            contact_id: self.resolver.contact_id(&organization),
            also_known_id: self.resolver.also_known_id(&organization),
            donors: record.donor_count()?,
            organization,
            country,
            diseases,
            materials,
        })
    }

    fn local_diseases(&self, record: &FinderRecord) -> BTreeSet<String> {
        let mut diseases = BTreeSet::new();
        for entry in &record.diseases {
            diseases.extend(entry.orphacode.tokens(CodeKind::Orphacode, self.normalizer));
            diseases.extend(entry.icd10.tokens(CodeKind::Icd10, self.normalizer));
        }
        diseases
    }

    fn catalogue_diseases(&self, organization: &str) -> Result<BTreeSet<String>> {
        let settings = self.catalogue_settings;
        let ids = self.catalogue.disease_ids(organization)?;
        Ok(ids
            .iter()
            .map(|id| id.trim())
            .filter(|id| !id.is_empty() && !id.contains(settings.excluded_namespace.as_str()))
            .map(|id| match id.strip_prefix(settings.orphanet_prefix.as_str()) {
                Some(code) => format!("{ORPHA_PREFIX}{code}"),
                None => id.to_string(),
            })
            .collect())
    }

    fn merge_contact(
        &self,
        store: &mut DirectoryStore,
        record: &FinderRecord,
        resolved: &ResolvedRecord,
        outcome: &mut RecordOutcome,
    ) -> Result<()> {
        if store.contains(EntityKind::Person, &resolved.contact_id) {
            return Ok(());
        }
        let contact = &record.main_contact;
        let person = Entity::new(&resolved.contact_id)
            .with("first_name", contact.first_name.trim())
            .with("last_name", contact.last_name.trim())
            .with("email", contact.email.trim())
            .with("country", resolved.country.as_str())
            .with("biobanks", resolved.biobank_id.as_str())
            .with("collections", resolved.collection_id.as_str())
            .with("national_node", Value::text_or_null(&resolved.national_node))
            .with("withdrawn", true);
        create(store, EntityKind::Person, person, outcome)
    }

    fn merge_also_known(
        &self,
        store: &mut DirectoryStore,
        resolved: &ResolvedRecord,
        outcome: &mut RecordOutcome,
    ) -> Result<()> {
        if store.contains(EntityKind::AlsoKnownIn, &resolved.also_known_id) {
            return Ok(());
        }
        let also_known = Entity::new(&resolved.also_known_id)
            .with(
                "name_system",
                self.resolver.identity().also_known_system.as_str(),
            )
            .with("pid", resolved.organization.as_str())
            .with("url", Value::Null)
            .with("national_node", Value::text_or_null(&resolved.national_node));
        create(store, EntityKind::AlsoKnownIn, also_known, outcome)
    }

    fn merge_biobank(
        &self,
        store: &mut DirectoryStore,
        record: &FinderRecord,
        resolved: &ResolvedRecord,
        outcome: &mut RecordOutcome,
    ) -> Result<()> {
        if store.contains(EntityKind::Biobank, &resolved.biobank_id) {
            let network = [self.resolver.network()];
            for attribute in BIOBANK_ACCUMULATING {
                union(store, EntityKind::Biobank, &resolved.biobank_id, attribute, network, outcome)?;
            }
            return Ok(());
        }
        self.create_biobank(store, record, resolved, outcome)
    }

    fn create_biobank(
        &self,
        store: &mut DirectoryStore,
        record: &FinderRecord,
        resolved: &ResolvedRecord,
        outcome: &mut RecordOutcome,
    ) -> Result<()> {
        let core = &record.bb_core;
        let biobank = Entity::new(&resolved.biobank_id)
            .with("pid", resolved.biobank_id.as_str())
            .with("name", record.name.trim())
            .with("acronym", Value::text_or_null(core.acronym.trim()))
            .with("description", Value::text_or_null(core.description.trim()))
            .with("url", Value::text_or_null(record.primary_url()))
            .with("location", Value::Null)
            .with("country", resolved.country.as_str())
            .with("head", Value::Null)
            .with("contact", resolved.contact_id.as_str())
            .with(
                "juridical_person",
                Value::text_or_null(record.address.host_institution.trim()),
            )
            .with("network", self.resolver.network())
            .with("also_known", Value::Null)
            .with("collections", Value::Null)
            .with("capabilities", Value::Null)
            .with("quality", Value::Null)
            .with("collaboration_commercial", Value::Null)
            .with("collaboration_non_for_profit", Value::Null)
            .with("national_node", Value::text_or_null(&resolved.national_node))
            .with("withdrawn", true);
        create(store, EntityKind::Biobank, biobank, outcome)
    }

    fn merge_collection(
        &self,
        store: &mut DirectoryStore,
        record: &FinderRecord,
        resolved: &ResolvedRecord,
        outcome: &mut RecordOutcome,
    ) -> Result<()> {
        let id = resolved.collection_id.as_str();
        if store.contains(EntityKind::Collection, id) {
            let network = self.resolver.network();
            for attribute in COLLECTION_ACCUMULATING {
                let tokens: Vec<&str> = match *attribute {
                    "also_known" => vec![resolved.also_known_id.as_str()],
                    "diagnosis_available" => resolved.diseases.iter().map(String::as_str).collect(),
                    _ => vec![network],
                };
                union(store, EntityKind::Collection, id, attribute, tokens, outcome)?;
            }
            // A biobank created for this record has no collections listed yet.
            let biobank = (EntityKind::Biobank, resolved.biobank_id.clone());
            if outcome.created.contains(&biobank) {
                store.union_merge(
                    EntityKind::Biobank,
                    &resolved.biobank_id,
                    BIOBANK_COLLECTIONS,
                    [id],
                )?;
            }
            return Ok(());
        }

        // A collection never exists without its biobank.
        if !store.contains(EntityKind::Biobank, &resolved.biobank_id) {
            debug!(biobank = %resolved.biobank_id, "creating biobank for new collection");
            self.create_biobank(store, record, resolved, outcome)?;
        }

        let donors = i64::try_from(resolved.donors).unwrap_or(i64::MAX);
        let collection = Entity::new(id)
            .with("name", MAIN_COLLECTION_NAME)
            .with("country", resolved.country.as_str())
            .with("contact", resolved.contact_id.as_str())
            .with("national_node", Value::text_or_null(&resolved.national_node))
            .with("parent_collection", Value::Null)
            .with("biobank", resolved.biobank_id.as_str())
            .with("biobank_label", record.name.trim())
            .with("network", self.resolver.network())
            .with("combined_network", self.resolver.network())
            .with("also_known", resolved.also_known_id.as_str())
            .with("type", COLLECTION_TYPE)
            .with("data_categories", DATA_CATEGORIES)
            .with("order_of_magnitude", 0_i64)
            .with("number_of_donors", donors)
            .with("order_of_magnitude_donors", order_of_magnitude(resolved.donors))
            .with("diagnosis_available", Value::text_or_null(join_tokens(&resolved.diseases)))
            .with("materials", Value::text_or_null(join_tokens(&resolved.materials)));
        store.insert_collection(collection)?;
        outcome.created.push((EntityKind::Collection, id.to_string()));
        let biobank = (EntityKind::Biobank, resolved.biobank_id.clone());
        if !outcome.created.contains(&biobank) && !outcome.updated.contains(&biobank) {
            outcome.updated.push(biobank);
        }
        Ok(())
    }
}

fn create(
    store: &mut DirectoryStore,
    kind: EntityKind,
    entity: Entity,
    outcome: &mut RecordOutcome,
) -> Result<()> {
    let id = entity.id().unwrap_or_default().to_string();
    store.insert(kind, entity)?;
    debug!(sheet = %kind, id = %id, "created entity");
    outcome.created.push((kind, id));
    Ok(())
}

fn union<I, S>(
    store: &mut DirectoryStore,
    kind: EntityKind,
    id: &str,
    attribute: &str,
    tokens: I,
    outcome: &mut RecordOutcome,
) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    if store.union_merge(kind, id, attribute, tokens)? {
        debug!(sheet = %kind, id, attribute, "merged accumulating field");
        let entry = (kind, id.to_string());
        if !outcome.updated.contains(&entry) {
            outcome.updated.push(entry);
        }
    }
    Ok(())
}
