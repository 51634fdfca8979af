//! Sample catalogue lookups.
//!
//! The catalogue answers which diseases its samples declare for an
//! organization. Lookups are best-effort: callers treat an error as "no
//! additional codes".

use std::path::Path;

use serde::Deserialize;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::error::{IngestError, Result};
use crate::finder::OrganizationId;

pub trait SampleCatalogue {
    /// Raw disease ids declared by samples of `organization`.
    fn disease_ids(&self, organization: &str) -> Result<Vec<String>>;
}

/// Catalogue that knows no samples.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCatalogue;

impl SampleCatalogue for NoCatalogue {
    fn disease_ids(&self, _organization: &str) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Sample {
    #[serde(rename = "BiobankID")]
    pub biobank_id: OrganizationId,
    #[serde(rename = "Disease", default)]
    pub diseases: Vec<DiseaseRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiseaseRef {
    #[serde(rename = "ID")]
    pub id: String,
}

#[derive(Debug, Clone)]
enum Response {
    Samples(Vec<Sample>),
    Errors(String),
}

/// Catalogue dump saved as a JSON file.
///
/// The file is either an array of samples or an error-shaped object with
/// an `errors` key, which every lookup then reports.
#[derive(Debug, Clone)]
pub struct JsonSampleCatalogue {
    response: Response,
}

impl JsonSampleCatalogue {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| IngestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text, path)
    }

    /// `origin` only labels errors.
    pub fn from_json(text: &str, origin: &Path) -> Result<Self> {
        let value: JsonValue = serde_json::from_str(text).map_err(|source| IngestError::Json {
            path: origin.to_path_buf(),
            source,
        })?;
        if let Some(errors) = value.get("errors") {
            return Ok(Self {
                response: Response::Errors(errors.to_string()),
            });
        }
        let samples: Vec<Sample> =
            serde_json::from_value(value).map_err(|source| IngestError::Json {
                path: origin.to_path_buf(),
                source,
            })?;
        debug!(samples = samples.len(), "loaded sample catalogue");
        Ok(Self::from_samples(samples))
    }

    pub fn from_samples(samples: Vec<Sample>) -> Self {
        Self {
            response: Response::Samples(samples),
        }
    }
}

impl SampleCatalogue for JsonSampleCatalogue {
    fn disease_ids(&self, organization: &str) -> Result<Vec<String>> {
        match &self.response {
            Response::Errors(message) => Err(IngestError::CatalogueResponse {
                message: message.clone(),
            }),
            Response::Samples(samples) => Ok(samples
                .iter()
                .filter(|sample| sample.biobank_id.key() == organization)
                .flat_map(|sample| sample.diseases.iter().map(|d| d.id.clone()))
                .collect()),
        }
    }
}
