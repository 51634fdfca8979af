use std::path::PathBuf;

use bbdir_model::ModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed finder record {organization}: {source}")]
    Record {
        organization: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("organization {organization}: invalid donor count {value:?}")]
    InvalidDonorCount { organization: String, value: String },

    #[error("organization {organization}: invalid biomaterial list: {source}")]
    InvalidBiomaterials {
        organization: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write CSV {path}: {message}")]
    Csv { path: PathBuf, message: String },

    #[error("sample catalogue returned an error response: {message}")]
    CatalogueResponse { message: String },

    #[error("invalid workbook {path}: {source}")]
    Workbook {
        path: PathBuf,
        #[source]
        source: ModelError,
    },
}

pub type Result<T> = std::result::Result<T, IngestError>;
