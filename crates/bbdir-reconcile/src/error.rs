use bbdir_ingest::IngestError;
use bbdir_model::ModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("organization {organization}: unknown country {country:?}")]
    UnknownCountry {
        organization: String,
        country: String,
    },

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Ingest(#[from] IngestError),
}

pub type Result<T> = std::result::Result<T, ReconcileError>;
